//! CSV row import

use std::collections::HashMap;
use std::io::Read;

use uuid::Uuid;

use crate::storage::{StoreError, VocabStore};
use crate::vocab::models::CardFields;

use super::Result;

/// Outcome of a bulk import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Import cards from CSV into an existing deck.
///
/// Columns are matched by header name, case-insensitively; only
/// `english` and `german` are required. Rows that fail validation
/// (blank required field, unrecognized article) are skipped and
/// counted, not fatal. An unknown deck id is fatal.
pub fn import_csv(
    store: &mut VocabStore,
    deck_id: Uuid,
    input: impl Read,
) -> Result<ImportReport> {
    // Surface an unknown deck before reading any rows.
    store.get_deck(deck_id)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_lowercase(), idx))
        .collect();

    let field = |record: &csv::StringRecord, name: &str| -> Option<String> {
        columns
            .get(name)
            .and_then(|&idx| record.get(idx))
            .map(|value| value.to_string())
    };

    let mut report = ImportReport {
        imported: 0,
        skipped: 0,
    };

    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                log::warn!("skipping malformed row {}: {}", row + 1, err);
                report.skipped += 1;
                continue;
            }
        };

        let fields = CardFields {
            english: field(&record, "english").unwrap_or_default(),
            german: field(&record, "german").unwrap_or_default(),
            article: field(&record, "article"),
            plural: field(&record, "plural"),
            example: field(&record, "example"),
            notes: field(&record, "notes"),
        };

        match store.create_card(deck_id, fields) {
            Ok(_) => report.imported += 1,
            Err(StoreError::Validation(reason)) => {
                log::warn!("skipping row {}: {}", row + 1, reason);
                report.skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    log::info!(
        "imported {} cards into deck {} ({} skipped)",
        report.imported,
        deck_id,
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::TransferError;
    use crate::vocab::models::Article;

    #[test]
    fn test_import_maps_columns_by_header() {
        let mut store = VocabStore::open_in_memory().unwrap();
        let deck = store.create_deck("Tiere").unwrap();

        let csv_data = "\
german,english,article,plural
Katze,cat,die,Katzen
Hund,dog,der,
laufen,to run,,
";
        let report = import_csv(&mut store, deck.id, csv_data.as_bytes()).unwrap();
        assert_eq!(report, ImportReport { imported: 3, skipped: 0 });

        let cards = store.list_cards_by_deck(deck.id).unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].english, "cat");
        assert_eq!(cards[0].article, Some(Article::Die));
        assert_eq!(cards[0].plural.as_deref(), Some("Katzen"));
        assert_eq!(cards[1].plural, None);
        assert_eq!(cards[2].article, None);
    }

    #[test]
    fn test_import_skips_invalid_rows() {
        let mut store = VocabStore::open_in_memory().unwrap();
        let deck = store.create_deck("Tiere").unwrap();

        let csv_data = "\
english,german,article
cat,Katze,die
,Hund,der
bird,Vogel,les
";
        let report = import_csv(&mut store, deck.id, csv_data.as_bytes()).unwrap();
        assert_eq!(report, ImportReport { imported: 1, skipped: 2 });
        assert_eq!(store.list_cards_by_deck(deck.id).unwrap().len(), 1);
    }

    #[test]
    fn test_import_unknown_deck_is_fatal() {
        let mut store = VocabStore::open_in_memory().unwrap();
        let result = import_csv(&mut store, Uuid::new_v4(), "english,german\n".as_bytes());
        assert!(matches!(
            result,
            Err(TransferError::Store(StoreError::DeckNotFound(_)))
        ));
    }
}
