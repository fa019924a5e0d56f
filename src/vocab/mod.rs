//! Vocabulary decks and spaced repetition
//!
//! This module provides:
//! - Deck and card data models
//! - The deterministic review scheduling function
//! - Session queue construction
//! - The interactive study session state machine

pub mod models;
pub mod queue;
pub mod scheduler;
pub mod session;

pub use models::*;
pub use queue::build_queue;
pub use scheduler::{transition, Grade};
pub use session::{GradeOutcome, SessionError, SessionSummary, StudyMode, StudySession};
