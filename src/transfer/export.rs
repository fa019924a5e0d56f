//! CSV deck export

use std::io::Write;

use uuid::Uuid;

use crate::storage::VocabStore;

use super::Result;

/// Write a deck's cards as CSV, one row per card. Returns the number
/// of rows written.
pub fn export_csv(store: &VocabStore, deck_id: Uuid, output: impl Write) -> Result<usize> {
    // NotFound for an unknown deck rather than an empty file.
    store.get_deck(deck_id)?;
    let cards = store.list_cards_by_deck(deck_id)?;

    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["english", "german", "article", "plural", "example", "notes"])?;
    for card in &cards {
        writer.write_record([
            card.english.as_str(),
            card.german.as_str(),
            card.article.map(|a| a.as_str()).unwrap_or(""),
            card.plural.as_deref().unwrap_or(""),
            card.example.as_deref().unwrap_or(""),
            card.notes.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(cards.len())
}
