//! Clear command - delete the saved menu.

use radial_core::{Config, MenuStore};
use std::io::{self, Write};

/// Run the clear command.
pub fn run(config: Config, skip_confirm: bool) -> anyhow::Result<()> {
    let store = MenuStore::new(config.menu_path()?);

    if !store.exists() {
        println!("No saved menu found. Nothing to clear.");
        return Ok(());
    }

    if !skip_confirm {
        print!("This will delete your menu. Are you sure? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.clear()?;
    println!("Menu cleared. The next index rebuilds it from your default apps.");

    Ok(())
}
