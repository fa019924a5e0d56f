//! Deck subcommands

use crate::app::App;
use crate::OutputFormat;

pub fn list(app: &App, format: OutputFormat) -> anyhow::Result<()> {
    let decks = app.store.list_decks()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&decks)?),
        OutputFormat::Plain => {
            if decks.is_empty() {
                println!("no decks");
                return Ok(());
            }
            for deck in decks {
                println!(
                    "{}  {}  (created {})",
                    deck.id,
                    deck.name,
                    deck.created_at.format("%Y-%m-%d")
                );
            }
        }
    }
    Ok(())
}

pub fn add(app: &mut App, name: &str) -> anyhow::Result<()> {
    let deck = app.store.create_deck(name)?;
    println!("created deck {} ({})", deck.name, deck.id);
    Ok(())
}

pub fn rename(app: &mut App, deck_ref: &str, name: &str) -> anyhow::Result<()> {
    let deck = app.resolve_deck(deck_ref)?;
    app.store.rename_deck(deck.id, name)?;
    println!("renamed {} to {}", deck.name, name.trim());
    Ok(())
}

pub fn rm(app: &mut App, deck_ref: &str, yes: bool) -> anyhow::Result<()> {
    let deck = app.resolve_deck(deck_ref)?;
    if !yes {
        anyhow::bail!(
            "this deletes {:?} and all its cards; re-run with --yes",
            deck.name
        );
    }
    app.store.delete_deck(deck.id)?;
    println!("deleted deck {}", deck.name);
    Ok(())
}
