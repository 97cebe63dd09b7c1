//! Menu command - show and edit the curated menu.
//!
//! Every edit is saved immediately.

use crate::app::{position_index, App};
use crate::MenuAction;
use radial_core::{AppIdentifier, Config, EntryStore, Locale, MenuList};

/// Run the menu command.
pub fn run(config: Config, action: MenuAction) -> anyhow::Result<()> {
    let app = App::new(config)?;
    app.index_and_wait();

    match action {
        MenuAction::List => {}
        MenuAction::Add { app: wanted, at } => {
            let identifier = resolve_app(&app, &wanted)?;
            let at = at.map(position_index).transpose()?;
            let added = app.coordinator.edit_menu(|menu, _| match at {
                Some(position) => menu.insert(position, identifier.clone()),
                None => menu.push(identifier.clone()),
            });
            if !added {
                anyhow::bail!("{} is already in the menu", identifier);
            }
            app.save_menu()?;
            println!("Added {}", identifier);
        }
        MenuAction::Remove { position } => {
            let index = position_index(position)?;
            let removed = app.coordinator.edit_menu(|menu, _| menu.remove(index));
            let Some(identifier) = removed else {
                anyhow::bail!("no menu entry at position {}", position);
            };
            app.save_menu()?;
            println!("Removed {}", identifier);
        }
        MenuAction::Move { from, to } => {
            let (from, to) = (position_index(from)?, position_index(to)?);
            app.coordinator
                .edit_menu(|menu, _| menu.move_entry(from, to))?;
            app.save_menu()?;
        }
        MenuAction::Reset => {
            app.coordinator.reset_menu();
            app.save_menu()?;
            println!("Menu reset to default apps.");
        }
    }

    print_menu(&app.coordinator.menu(), &app.coordinator.entries_snapshot());
    Ok(())
}

/// An identifier that resolves in the index, or the best search match.
fn resolve_app(app: &App, wanted: &str) -> anyhow::Result<AppIdentifier> {
    if let Some(identifier) = AppIdentifier::parse(wanted) {
        if app.coordinator.entry(&identifier).is_some() {
            return Ok(identifier);
        }
    }

    app.coordinator
        .search(wanted, &Locale::current())
        .first()
        .map(|entry| entry.identifier.clone())
        .ok_or_else(|| anyhow::anyhow!("no installed app matches '{}'", wanted))
}

fn print_menu(menu: &MenuList, store: &EntryStore) {
    if menu.is_empty() {
        println!("Menu is empty. Add apps with 'radial menu add <app>'.");
        return;
    }
    for (position, identifier) in menu.iter().enumerate() {
        let label = store
            .get(identifier)
            .map(|entry| entry.label.clone())
            .unwrap_or_default();
        println!("{:>3}. {:<32} {}", position + 1, label, identifier);
    }
}
