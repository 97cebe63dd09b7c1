//! Query command - search installed apps.

use crate::app::App;
use crate::OutputFormat;
use radial_core::{Config, Locale};
use std::time::Instant;

/// Run the query command.
pub fn run(
    config: Config,
    text: &str,
    limit: Option<usize>,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let app = App::new(config)?;
    let stats = app.index_and_wait();

    if stats.entries == 0 {
        eprintln!("No installed apps found. Check the [xdg] data_dirs setting.");
        return Ok(());
    }

    let limit = app.result_limit(limit);
    let start = Instant::now();
    let mut results = app.coordinator.search_tiered(text, &Locale::current());
    let elapsed = start.elapsed();
    let total = results.len();
    results.truncate(limit);

    match output {
        OutputFormat::Text => {
            for result in &results {
                let tier = result
                    .tier
                    .map(|tier| tier.to_string())
                    .unwrap_or_default();
                println!(
                    "{:<32} {:<10} {}",
                    result.entry.label, tier, result.entry.identifier
                );
            }

            eprintln!();
            eprintln!(
                "Found {} results in {:.3}ms",
                total,
                elapsed.as_secs_f64() * 1000.0
            );
        }
        OutputFormat::Json => {
            let json_results: Vec<serde_json::Value> = results
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "label": r.entry.label,
                        "id": r.entry.identifier,
                        "tier": r.tier,
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&json_results)?);
        }
    }

    Ok(())
}
