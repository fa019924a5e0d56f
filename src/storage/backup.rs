//! Snapshot backup files
//!
//! A snapshot is the canonical interchange format: a single JSON
//! object holding every deck and card at one point in time. Produced
//! by `VocabStore::export_snapshot` and consumed by
//! `VocabStore::restore_snapshot`.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vocab::models::{Card, Deck};

use super::store::Result;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Point-in-time view of both collections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub decks: Vec<Deck>,
    pub cards: Vec<Card>,
}

/// Write a snapshot to a JSON file.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
    Ok(())
}

/// Read a snapshot from a JSON file.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::VocabStore;
    use crate::vocab::models::CardFields;

    #[test]
    fn test_snapshot_file_round_trip() {
        let mut store = VocabStore::open_in_memory().unwrap();
        let deck = store.create_deck("Tiere").unwrap();
        store
            .create_card(
                deck.id,
                CardFields {
                    english: "cat".to_string(),
                    german: "Katze".to_string(),
                    article: Some("die".to_string()),
                    ..CardFields::default()
                },
            )
            .unwrap();

        let snapshot = store.export_snapshot().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        write_snapshot(&path, &snapshot).unwrap();

        let loaded = read_snapshot(&path).unwrap();
        assert_eq!(loaded.version, snapshot.version);
        assert_eq!(loaded.decks.len(), 1);
        assert_eq!(loaded.cards.len(), 1);
        assert_eq!(loaded.cards[0].german, "Katze");
        assert_eq!(loaded.cards[0].srs, snapshot.cards[0].srs);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut store = VocabStore::open_in_memory().unwrap();
        store.create_deck("Tiere").unwrap();
        let snapshot = store.export_snapshot().unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["exportedAt"].is_string());
        assert!(value["decks"].is_array());
        assert!(value["cards"].is_array());
    }
}
