//! Card subcommands

use anyhow::Context;
use chrono::Utc;
use uuid::Uuid;

use wortkarte::vocab::models::CardFields;
use wortkarte::vocab::scheduler::format_interval;

use crate::app::App;
use crate::OutputFormat;

pub fn add(app: &mut App, deck_ref: &str, fields: CardFields) -> anyhow::Result<()> {
    let deck = app.resolve_deck(deck_ref)?;
    let card = app.store.create_card(deck.id, fields)?;
    println!("added {} = {} ({})", card.english, card.spoken_form(), card.id);
    Ok(())
}

pub fn list(app: &App, deck_ref: &str, format: OutputFormat) -> anyhow::Result<()> {
    let deck = app.resolve_deck(deck_ref)?;
    let cards = app.store.list_cards_by_deck(deck.id)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("deck {} has no cards", deck.name);
                return Ok(());
            }
            let now = Utc::now();
            for card in cards {
                let due = if card.srs.is_due(now) {
                    "due now".to_string()
                } else {
                    format!("due in {}", format_interval(card.srs.interval_days))
                };
                println!(
                    "{}  {} = {}  [{}, reps {}]",
                    card.id,
                    card.english,
                    card.spoken_form(),
                    due,
                    card.srs.reps
                );
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    app: &mut App,
    id: &str,
    english: Option<String>,
    german: Option<String>,
    article: Option<String>,
    plural: Option<String>,
    example: Option<String>,
    notes: Option<String>,
) -> anyhow::Result<()> {
    let id = parse_card_id(id)?;
    let card = app.store.get_card(id)?;

    // Absent flags keep the stored value; review state is untouched
    // either way.
    let fields = CardFields {
        english: english.unwrap_or(card.english),
        german: german.unwrap_or(card.german),
        article: article.or_else(|| card.article.map(|a| a.as_str().to_string())),
        plural: plural.or(card.plural),
        example: example.or(card.example),
        notes: notes.or(card.notes),
    };

    let updated = app.store.update_card(id, fields)?;
    println!("updated {} = {}", updated.english, updated.spoken_form());
    Ok(())
}

pub fn rm(app: &mut App, id: &str) -> anyhow::Result<()> {
    let id = parse_card_id(id)?;
    app.store.delete_card(id)?;
    println!("deleted card {}", id);
    Ok(())
}

fn parse_card_id(id: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("invalid card id {:?}", id))
}
