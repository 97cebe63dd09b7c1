//! Index command - enumerate installed apps and save the menu.

use crate::app::App;
use radial_core::Config;
use std::time::Instant;

/// Run the index command.
pub fn run(config: Config) -> anyhow::Result<()> {
    let app = App::new(config)?;

    println!("Indexing installed apps...");

    let start = Instant::now();
    let stats = app.index_and_wait();
    let elapsed = start.elapsed();

    app.save_menu()?;

    println!();
    println!("Indexing complete!");
    println!("  Apps:        {}", stats.entries);
    println!("  Packages:    {}", stats.packages);
    println!("  Menu:        {}", stats.menu_entries);
    println!("  Time:        {:.2}s", elapsed.as_secs_f64());
    println!("  Menu saved:  {}", app.menu_path.display());

    Ok(())
}
