//! CLI application context
//!
//! Owns the open store and the deck-name resolution used by every
//! subcommand. No global state: the context is built in `main` and
//! passed down.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use uuid::Uuid;

use wortkarte::vocab::models::Deck;
use wortkarte::VocabStore;

pub struct App {
    pub store: VocabStore,
}

impl App {
    /// Open the store at an explicit path, or at the platform data
    /// directory default.
    pub fn open(db_override: Option<&Path>) -> anyhow::Result<Self> {
        let db_path = match db_override {
            Some(path) => path.to_path_buf(),
            None => Self::default_db_path()?,
        };
        let store = VocabStore::open(&db_path)
            .with_context(|| format!("failed to open store at {}", db_path.display()))?;
        Ok(Self { store })
    }

    pub fn default_db_path() -> anyhow::Result<PathBuf> {
        let base = dirs::data_dir().ok_or_else(|| anyhow!("no platform data directory"))?;
        Ok(base.join("wortkarte").join("wortkarte.db3"))
    }

    /// Resolve a deck reference: a raw id, an exact name
    /// (case-insensitive), or an unambiguous name prefix.
    pub fn resolve_deck(&self, reference: &str) -> anyhow::Result<Deck> {
        if let Ok(id) = Uuid::parse_str(reference) {
            return self.store.get_deck(id).map_err(Into::into);
        }

        let decks = self.store.list_decks()?;
        let wanted = reference.to_lowercase();

        if let Some(deck) = decks.iter().find(|d| d.name.to_lowercase() == wanted) {
            return Ok(deck.clone());
        }

        let matches: Vec<&Deck> = decks
            .iter()
            .filter(|d| d.name.to_lowercase().starts_with(&wanted))
            .collect();
        match matches.as_slice() {
            [deck] => Ok((*deck).clone()),
            [] => bail!("no deck matches {:?}", reference),
            _ => {
                let names: Vec<&str> = matches.iter().map(|d| d.name.as_str()).collect();
                bail!("ambiguous deck {:?}: matches {}", reference, names.join(", "))
            }
        }
    }
}
