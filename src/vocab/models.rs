//! Data models for the vocabulary trainer

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deck is a named collection of vocabulary cards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// Grammatical gender article of a German noun
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Article {
    Der,
    Die,
    Das,
}

impl Article {
    /// Parse an article from text, case-insensitively.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "der" => Some(Self::Der),
            "die" => Some(Self::Die),
            "das" => Some(Self::Das),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Der => "der",
            Self::Die => "die",
            Self::Das => "das",
        }
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editable text fields of a card, as entered by the user.
///
/// The article arrives as free text and is normalized (and validated)
/// at the store boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFields {
    pub english: String,
    pub german: String,
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A vocabulary card: an English/German pair with optional grammar notes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub english: String,
    pub german: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<Article>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub srs: ReviewState,
}

impl Card {
    /// A card that has never been graded
    pub fn is_fresh(&self) -> bool {
        self.srs.reps == 0
    }

    /// The form handed to a speech synthesizer: article + noun
    /// ("die Katze"), or the bare word for non-nouns.
    pub fn spoken_form(&self) -> String {
        match self.article {
            Some(article) => format!("{} {}", article, self.german),
            None => self.german.clone(),
        }
    }
}

/// Current spaced repetition state of a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// When the card should next be presented
    pub due: DateTime<Utc>,
    /// Current interval in days (fractional for sub-day steps)
    pub interval_days: f64,
    /// Ease factor, kept within [1.3, 3.0]
    pub ease: f64,
    /// Consecutive successful reviews
    pub reps: u32,
    /// Failed reviews over the card's lifetime
    pub lapses: u32,
}

impl ReviewState {
    /// State of a newly created card: due immediately.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            due: now,
            interval_days: 0.0,
            ease: 2.3,
            reps: 0,
            lapses: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }
}

/// Per-deck card counts for display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total: usize,
    pub due: usize,
    pub fresh: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_parse() {
        assert_eq!(Article::parse("der"), Some(Article::Der));
        assert_eq!(Article::parse("DIE"), Some(Article::Die));
        assert_eq!(Article::parse(" das "), Some(Article::Das));
        assert_eq!(Article::parse("den"), None);
        assert_eq!(Article::parse(""), None);
    }

    #[test]
    fn test_spoken_form() {
        let now = Utc::now();
        let mut card = Card {
            id: Uuid::new_v4(),
            deck_id: Uuid::new_v4(),
            english: "cat".to_string(),
            german: "Katze".to_string(),
            article: Some(Article::Die),
            plural: None,
            example: None,
            notes: None,
            created_at: now,
            srs: ReviewState::fresh(now),
        };
        assert_eq!(card.spoken_form(), "die Katze");

        card.article = None;
        card.german = "laufen".to_string();
        assert_eq!(card.spoken_form(), "laufen");
    }

    #[test]
    fn test_fresh_state_is_due_immediately() {
        let now = Utc::now();
        let state = ReviewState::fresh(now);
        assert!(state.is_due(now));
        assert_eq!(state.interval_days, 0.0);
        assert_eq!(state.ease, 2.3);
        assert_eq!(state.reps, 0);
        assert_eq!(state.lapses, 0);
    }
}
