//! Status command - show index status and statistics.

use crate::app::App;
use radial_core::{Config, MenuStore};

/// Run the status command.
pub fn run(config: Config) -> anyhow::Result<()> {
    let app = App::new(config)?;
    let saved = MenuStore::new(&app.menu_path).exists();
    let stats = app.index_and_wait();

    println!("Radial Status");
    println!("=============");
    println!();

    println!("Summary:");
    println!("  Installed apps:    {}", stats.entries);
    println!("  Packages:          {}", stats.packages);
    println!("  Menu entries:      {}", stats.menu_entries);
    println!("  Index passes:      {}", stats.generation);

    if let Some(indexed) = stats.last_indexed {
        println!(
            "  Last indexed:      {}",
            indexed.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    println!();
    println!("Search directories:");
    for dir in &app.backend.dirs().data_dirs {
        let marker = if dir.join("applications").is_dir() {
            "✓"
        } else {
            "-"
        };
        println!("  {} {}", marker, dir.display());
    }

    println!();
    println!(
        "Menu file: {}{}",
        app.menu_path.display(),
        if saved { "" } else { " (not saved yet)" }
    );
    println!("Config:    {}", radial_core::Config::default_config_path()?.display());

    Ok(())
}
