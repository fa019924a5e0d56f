//! SQLite-backed storage for decks and cards
//!
//! Two tables, `decks` and `cards`, with secondary indexes on
//! `cards.deck_id` (cascade delete, per-deck listing) and `cards.due`
//! (due-set queries). Every mutating operation runs inside a single
//! transaction: either all of its effects commit or none do.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC text, so lexical
//! order equals chronological order and the due index is usable with
//! plain string comparison.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::vocab::models::{Article, Card, CardFields, Deck, DeckStats, ReviewState};

use super::backup::{Snapshot, SNAPSHOT_VERSION};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("card not found: {0}")]
    CardNotFound(Uuid),

    #[error("storage transaction failed: {0}")]
    Transaction(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable keyed storage for decks and cards with cascading integrity
pub struct VocabStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl VocabStore {
    /// Open (or create) a store at the given path.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn,
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// Open an in-memory store. Used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn,
            db_path: None,
        })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS decks (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS cards (
                id TEXT PRIMARY KEY,
                deck_id TEXT NOT NULL REFERENCES decks(id),
                english TEXT NOT NULL,
                german TEXT NOT NULL,
                article TEXT,
                plural TEXT,
                example TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                due TEXT NOT NULL,
                interval_days REAL NOT NULL,
                ease REAL NOT NULL,
                reps INTEGER NOT NULL,
                lapses INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cards_deck_id ON cards(deck_id);
            CREATE INDEX IF NOT EXISTS idx_cards_due ON cards(due);
            "#,
        )
    }

    /// Path of the backing database file, if any.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    // ==================== Deck Operations ====================

    /// Create a new deck with a trimmed, non-empty name.
    pub fn create_deck(&mut self, name: &str) -> Result<Deck> {
        let name = validate_name(name)?;
        let deck = Deck::new(name);

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO decks (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![
                deck.id.to_string(),
                deck.name,
                to_sql_ts(deck.created_at)
            ],
        )?;
        tx.commit()?;

        log::info!("created deck {} ({})", deck.name, deck.id);
        Ok(deck)
    }

    /// Replace a deck's name.
    pub fn rename_deck(&mut self, id: Uuid, name: &str) -> Result<()> {
        let name = validate_name(name)?;

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE decks SET name = ?1 WHERE id = ?2",
            params![name, id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::DeckNotFound(id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete a deck and every card referencing it, atomically.
    pub fn delete_deck(&mut self, id: Uuid) -> Result<()> {
        let tx = self.conn.transaction()?;
        let cards_removed = tx.execute(
            "DELETE FROM cards WHERE deck_id = ?1",
            params![id.to_string()],
        )?;
        let decks_removed =
            tx.execute("DELETE FROM decks WHERE id = ?1", params![id.to_string()])?;
        if decks_removed == 0 {
            // Roll back the card sweep: the deck never existed.
            return Err(StoreError::DeckNotFound(id));
        }
        tx.commit()?;

        log::info!("deleted deck {} and {} cards", id, cards_removed);
        Ok(())
    }

    /// All decks, ordered by name (case-insensitive).
    pub fn list_decks(&self) -> Result<Vec<Deck>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at FROM decks ORDER BY name COLLATE NOCASE ASC",
        )?;
        let decks = stmt
            .query_map([], deck_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(decks)
    }

    /// Get a specific deck.
    pub fn get_deck(&self, id: Uuid) -> Result<Deck> {
        self.conn
            .query_row(
                "SELECT id, name, created_at FROM decks WHERE id = ?1",
                params![id.to_string()],
                deck_from_row,
            )
            .optional()?
            .ok_or(StoreError::DeckNotFound(id))
    }

    // ==================== Card Operations ====================

    /// All cards in a deck, ordered by creation time.
    pub fn list_cards_by_deck(&self, deck_id: Uuid) -> Result<Vec<Card>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, deck_id, english, german, article, plural, example, notes,
                    created_at, due, interval_days, ease, reps, lapses
             FROM cards WHERE deck_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let cards = stmt
            .query_map(params![deck_id.to_string()], card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    /// Create a card in a deck with a fresh review state (due at once).
    pub fn create_card(&mut self, deck_id: Uuid, fields: CardFields) -> Result<Card> {
        let fields = normalize_fields(fields)?;
        let article = normalize_article(fields.article.as_deref())?;

        let now = Utc::now();
        let card = Card {
            id: Uuid::new_v4(),
            deck_id,
            english: fields.english,
            german: fields.german,
            article,
            plural: fields.plural,
            example: fields.example,
            notes: fields.notes,
            created_at: now,
            srs: ReviewState::fresh(now),
        };

        let tx = self.conn.transaction()?;
        if !deck_exists(&tx, deck_id)? {
            return Err(StoreError::DeckNotFound(deck_id));
        }
        insert_card(&tx, &card)?;
        tx.commit()?;

        Ok(card)
    }

    /// Get a specific card.
    pub fn get_card(&self, id: Uuid) -> Result<Card> {
        self.conn
            .query_row(
                "SELECT id, deck_id, english, german, article, plural, example, notes,
                        created_at, due, interval_days, ease, reps, lapses
                 FROM cards WHERE id = ?1",
                params![id.to_string()],
                card_from_row,
            )
            .optional()?
            .ok_or(StoreError::CardNotFound(id))
    }

    /// Replace a card's text fields. Review state, deck membership and
    /// creation time are untouched.
    pub fn update_card(&mut self, id: Uuid, fields: CardFields) -> Result<Card> {
        let fields = normalize_fields(fields)?;
        let article = normalize_article(fields.article.as_deref())?;

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE cards SET english = ?1, german = ?2, article = ?3, plural = ?4,
                              example = ?5, notes = ?6
             WHERE id = ?7",
            params![
                fields.english,
                fields.german,
                article.map(|a| a.as_str()),
                fields.plural,
                fields.example,
                fields.notes,
                id.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::CardNotFound(id));
        }
        tx.commit()?;

        self.get_card(id)
    }

    /// Delete a card. Deleting an already-absent card is a no-op, so
    /// a retried delete cannot fail.
    pub fn delete_card(&mut self, id: Uuid) -> Result<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute("DELETE FROM cards WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;

        if changed == 0 {
            log::debug!("delete_card: {} already absent", id);
        }
        Ok(())
    }

    /// Full replace of an existing card record. Used to persist a
    /// post-grading review state.
    pub fn put_card(&mut self, card: &Card) -> Result<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE cards SET deck_id = ?1, english = ?2, german = ?3, article = ?4,
                              plural = ?5, example = ?6, notes = ?7, created_at = ?8,
                              due = ?9, interval_days = ?10, ease = ?11, reps = ?12,
                              lapses = ?13
             WHERE id = ?14",
            params![
                card.deck_id.to_string(),
                card.english,
                card.german,
                card.article.map(|a| a.as_str()),
                card.plural,
                card.example,
                card.notes,
                to_sql_ts(card.created_at),
                to_sql_ts(card.srs.due),
                card.srs.interval_days,
                card.srs.ease,
                card.srs.reps,
                card.srs.lapses,
                card.id.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::CardNotFound(card.id));
        }
        tx.commit()?;
        Ok(())
    }

    // ==================== Snapshot Operations ====================

    /// Point-in-time view of both collections, taken inside one read
    /// transaction so no concurrent partial write is observable.
    pub fn export_snapshot(&mut self) -> Result<Snapshot> {
        let tx = self.conn.transaction()?;

        let decks = {
            let mut stmt = tx.prepare(
                "SELECT id, name, created_at FROM decks ORDER BY name COLLATE NOCASE ASC",
            )?;
            let decks = stmt
                .query_map([], deck_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            decks
        };

        let cards = {
            let mut stmt = tx.prepare(
                "SELECT id, deck_id, english, german, article, plural, example, notes,
                        created_at, due, interval_days, ease, reps, lapses
                 FROM cards ORDER BY created_at ASC, rowid ASC",
            )?;
            let cards = stmt
                .query_map([], card_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            cards
        };

        tx.commit()?;

        Ok(Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            decks,
            cards,
        })
    }

    /// Atomically replace both collections with the snapshot contents.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Validation(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM cards", [])?;
        tx.execute("DELETE FROM decks", [])?;
        for deck in &snapshot.decks {
            tx.execute(
                "INSERT INTO decks (id, name, created_at) VALUES (?1, ?2, ?3)",
                params![deck.id.to_string(), deck.name, to_sql_ts(deck.created_at)],
            )?;
        }
        for card in &snapshot.cards {
            insert_card(&tx, card)?;
        }
        tx.commit()?;

        log::info!(
            "restored snapshot: {} decks, {} cards",
            snapshot.decks.len(),
            snapshot.cards.len()
        );
        Ok(())
    }

    /// Atomically clear both collections.
    pub fn wipe_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM cards", [])?;
        tx.execute("DELETE FROM decks", [])?;
        tx.commit()?;
        Ok(())
    }

    // ==================== View Queries ====================

    /// Card counts for a deck at an explicit point in time.
    pub fn deck_stats(&self, deck_id: Uuid, now: DateTime<Utc>) -> Result<DeckStats> {
        // Existence check first so an unknown deck is NotFound, not
        // an all-zero stats row.
        self.get_deck(deck_id)?;

        let (total, due, fresh) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(due <= ?2), 0),
                    COALESCE(SUM(reps = 0), 0)
             FROM cards WHERE deck_id = ?1",
            params![deck_id.to_string(), to_sql_ts(now)],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;

        Ok(DeckStats {
            total: total as usize,
            due: due as usize,
            fresh: fresh as usize,
        })
    }
}

// ==================== Row Mapping ====================

fn to_sql_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn ts_from_sql(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn uuid_from_sql(idx: usize, raw: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn deck_from_row(row: &rusqlite::Row) -> rusqlite::Result<Deck> {
    Ok(Deck {
        id: uuid_from_sql(0, row.get(0)?)?,
        name: row.get(1)?,
        created_at: ts_from_sql(2, row.get(2)?)?,
    })
}

fn card_from_row(row: &rusqlite::Row) -> rusqlite::Result<Card> {
    let article: Option<String> = row.get(4)?;
    let article = match article {
        Some(raw) => Some(Article::parse(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unrecognized article {:?}", raw).into(),
            )
        })?),
        None => None,
    };

    Ok(Card {
        id: uuid_from_sql(0, row.get(0)?)?,
        deck_id: uuid_from_sql(1, row.get(1)?)?,
        english: row.get(2)?,
        german: row.get(3)?,
        article,
        plural: row.get(5)?,
        example: row.get(6)?,
        notes: row.get(7)?,
        created_at: ts_from_sql(8, row.get(8)?)?,
        srs: ReviewState {
            due: ts_from_sql(9, row.get(9)?)?,
            interval_days: row.get(10)?,
            ease: row.get(11)?,
            reps: row.get(12)?,
            lapses: row.get(13)?,
        },
    })
}

fn deck_exists(tx: &Transaction, id: Uuid) -> rusqlite::Result<bool> {
    tx.query_row(
        "SELECT 1 FROM decks WHERE id = ?1",
        params![id.to_string()],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

fn insert_card(tx: &Transaction, card: &Card) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO cards (id, deck_id, english, german, article, plural, example,
                            notes, created_at, due, interval_days, ease, reps, lapses)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            card.id.to_string(),
            card.deck_id.to_string(),
            card.english,
            card.german,
            card.article.map(|a| a.as_str()),
            card.plural,
            card.example,
            card.notes,
            to_sql_ts(card.created_at),
            to_sql_ts(card.srs.due),
            card.srs.interval_days,
            card.srs.ease,
            card.srs.reps,
            card.srs.lapses,
        ],
    )?;
    Ok(())
}

// ==================== Field Normalization ====================

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("deck name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Trim all text fields; required ones must survive trimming, optional
/// ones collapse to `None` when blank.
fn normalize_fields(fields: CardFields) -> Result<CardFields> {
    let english = fields.english.trim().to_string();
    if english.is_empty() {
        return Err(StoreError::Validation("english must not be empty".into()));
    }
    let german = fields.german.trim().to_string();
    if german.is_empty() {
        return Err(StoreError::Validation("german must not be empty".into()));
    }

    Ok(CardFields {
        english,
        german,
        article: normalize_opt(fields.article),
        plural: normalize_opt(fields.plural),
        example: normalize_opt(fields.example),
        notes: normalize_opt(fields.notes),
    })
}

fn normalize_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_article(raw: Option<&str>) -> Result<Option<Article>> {
    match raw {
        None => Ok(None),
        Some(text) => Article::parse(text)
            .map(Some)
            .ok_or_else(|| StoreError::Validation(format!("unrecognized article {:?}", text))),
    }
}
