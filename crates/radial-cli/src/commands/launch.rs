//! Launch command - start the app at a menu position.

use crate::app::{position_index, App};
use radial_core::Config;

/// Run the launch command.
pub fn run(config: Config, position: usize) -> anyhow::Result<()> {
    let index = position_index(position)?;
    let app = App::new(config)?;
    app.index_and_wait();

    let menu = app.coordinator.menu();
    let Some(identifier) = menu.get(index).cloned() else {
        anyhow::bail!("menu has {} entries, no position {}", menu.len(), position);
    };

    if !app
        .coordinator
        .launch_selected(Some(index), Some(app.launcher()))
    {
        anyhow::bail!("failed to launch {}", identifier);
    }

    let label = app
        .coordinator
        .entry(&identifier)
        .map(|entry| entry.label.clone())
        .unwrap_or_else(|| identifier.to_string());
    println!("Launched {}", label);

    Ok(())
}
