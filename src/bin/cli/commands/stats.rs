//! Per-deck card counts

use chrono::Utc;
use serde::Serialize;

use wortkarte::vocab::models::DeckStats;

use crate::app::App;
use crate::OutputFormat;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckRow {
    name: String,
    #[serde(flatten)]
    stats: DeckStats,
}

pub fn run(app: &App, deck_ref: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    let now = Utc::now();

    let decks = match deck_ref {
        Some(deck_ref) => vec![app.resolve_deck(deck_ref)?],
        None => app.store.list_decks()?,
    };

    let mut rows = Vec::new();
    for deck in decks {
        let stats = app.store.deck_stats(deck.id, now)?;
        rows.push(DeckRow {
            name: deck.name,
            stats,
        });
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            if rows.is_empty() {
                println!("no decks");
                return Ok(());
            }
            for row in rows {
                println!(
                    "{}: {} cards, {} due, {} new",
                    row.name, row.stats.total, row.stats.due, row.stats.fresh
                );
            }
        }
    }
    Ok(())
}
