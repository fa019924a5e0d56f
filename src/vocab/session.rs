//! Study session state machine
//!
//! One interactive session: Idle → Active → Complete. The active
//! session owns transient clones of its cards; graded results are
//! written back through the store immediately, so an abandoned session
//! loses nothing that was already graded.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::{StoreError, VocabStore};

use super::models::{Article, Card};
use super::queue::build_queue;
use super::scheduler::{transition, Grade};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("deck has no cards to study")]
    EmptyDeck,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How cards are presented during a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyMode {
    /// Show one side, flip to reveal the other
    Flashcard,
    /// Guess the noun's article before seeing it
    GenderQuiz,
}

/// What happened when a card was graded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeOutcome {
    /// GenderQuiz only: the learner has not committed to an answer,
    /// nothing was graded or persisted
    NotAnswered,
    /// The card was graded and the next one is up
    Next,
    /// The card was graded and the session is complete
    Finished,
}

/// What remains after a session ends
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub deck_id: Uuid,
    pub mode: StudyMode,
    pub done: usize,
}

#[derive(Debug)]
struct Active {
    deck_id: Uuid,
    mode: StudyMode,
    goal: usize,
    done: usize,
    queue: VecDeque<Card>,
    current: Card,
    flipped: bool,
    answered: bool,
    correct: bool,
}

#[derive(Debug)]
enum State {
    Idle,
    Active(Active),
    Complete(SessionSummary),
}

/// Driver for one study session.
///
/// Session commands issued in the wrong state or mode are caller
/// contract violations and panic; only `grade` before an answer in
/// GenderQuiz mode is an expected no-op.
#[derive(Debug)]
pub struct StudySession {
    state: State,
}

impl Default for StudySession {
    fn default() -> Self {
        Self::new()
    }
}

impl StudySession {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Begin a session over a deck. The effective goal is
    /// `min(goal, card count)`; a deck with zero cards cannot be
    /// studied. Also the only way out of a completed session.
    ///
    /// # Panics
    ///
    /// Panics if `goal` is zero.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        store: &VocabStore,
        deck_id: Uuid,
        mode: StudyMode,
        goal: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        assert!(goal >= 1, "session goal must be at least 1");

        let cards = store.list_cards_by_deck(deck_id)?;
        if cards.is_empty() {
            return Err(SessionError::EmptyDeck);
        }

        let goal = goal.min(cards.len());
        let mut queue: VecDeque<Card> = build_queue(&cards, goal, now, rng).into();
        let current = queue.pop_front().expect("queue is non-empty");

        self.state = State::Active(Active {
            deck_id,
            mode,
            goal,
            done: 0,
            queue,
            current,
            flipped: false,
            answered: false,
            correct: false,
        });
        Ok(())
    }

    /// Flashcard mode: toggle between front and back of the current
    /// card. Repeatable; grading is unaffected.
    ///
    /// # Panics
    ///
    /// Panics outside an active flashcard session.
    pub fn flip(&mut self) {
        let active = self.active_mut("flip()");
        assert!(
            active.mode == StudyMode::Flashcard,
            "flip() is only valid in flashcard mode"
        );
        active.flipped = !active.flipped;
    }

    /// GenderQuiz mode: commit to an article choice for the current
    /// card. Answering again before grading overwrites the previous
    /// choice.
    ///
    /// # Panics
    ///
    /// Panics outside an active gender-quiz session.
    pub fn answer_gender(&mut self, choice: Article) {
        let active = self.active_mut("answer_gender()");
        assert!(
            active.mode == StudyMode::GenderQuiz,
            "answer_gender() is only valid in gender-quiz mode"
        );
        active.answered = true;
        active.correct = active.current.article == Some(choice);
    }

    /// GenderQuiz mode: surface the correct article without crediting
    /// a guess. No effect if the learner already answered.
    ///
    /// # Panics
    ///
    /// Panics outside an active gender-quiz session.
    pub fn reveal(&mut self) {
        let active = self.active_mut("reveal()");
        assert!(
            active.mode == StudyMode::GenderQuiz,
            "reveal() is only valid in gender-quiz mode"
        );
        if !active.answered {
            active.answered = true;
            active.correct = false;
        }
    }

    /// Grade the current card, persist its new review state, and
    /// advance. In GenderQuiz mode the learner must have committed to
    /// an answer first; otherwise the call is a no-op signalled by
    /// [`GradeOutcome::NotAnswered`].
    ///
    /// # Panics
    ///
    /// Panics outside an active session.
    pub fn grade(
        &mut self,
        store: &mut VocabStore,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<GradeOutcome, SessionError> {
        let active = match &mut self.state {
            State::Active(active) => active,
            _ => panic!("grade() outside an active session"),
        };

        if active.mode == StudyMode::GenderQuiz && !active.answered {
            return Ok(GradeOutcome::NotAnswered);
        }

        active.current.srs = transition(&active.current.srs, grade, now);
        store.put_card(&active.current)?;
        active.done += 1;

        if active.done >= active.goal || active.queue.is_empty() {
            let summary = SessionSummary {
                deck_id: active.deck_id,
                mode: active.mode,
                done: active.done,
            };
            self.state = State::Complete(summary);
            return Ok(GradeOutcome::Finished);
        }

        active.current = active.queue.pop_front().expect("queue is non-empty");
        active.flipped = false;
        active.answered = false;
        active.correct = false;
        Ok(GradeOutcome::Next)
    }

    // ==================== Accessors ====================

    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active(_))
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Complete(_))
    }

    /// The card currently presented, if a session is active.
    pub fn current(&self) -> Option<&Card> {
        match &self.state {
            State::Active(active) => Some(&active.current),
            _ => None,
        }
    }

    pub fn mode(&self) -> Option<StudyMode> {
        match &self.state {
            State::Active(active) => Some(active.mode),
            State::Complete(summary) => Some(summary.mode),
            State::Idle => None,
        }
    }

    /// (graded so far, session goal) while active.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match &self.state {
            State::Active(active) => Some((active.done, active.goal)),
            _ => None,
        }
    }

    pub fn flipped(&self) -> bool {
        matches!(&self.state, State::Active(active) if active.flipped)
    }

    pub fn answered(&self) -> bool {
        matches!(&self.state, State::Active(active) if active.answered)
    }

    pub fn correct(&self) -> bool {
        matches!(&self.state, State::Active(active) if active.correct)
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        match &self.state {
            State::Complete(summary) => Some(summary),
            _ => None,
        }
    }

    fn active_mut(&mut self, what: &str) -> &mut Active {
        match &mut self.state {
            State::Active(active) => active,
            _ => panic!("{} outside an active session", what),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::models::CardFields;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn store_with_deck(card_specs: &[(&str, &str, Option<&str>)]) -> (VocabStore, Uuid) {
        let mut store = VocabStore::open_in_memory().unwrap();
        let deck = store.create_deck("Tiere").unwrap();
        for (english, german, article) in card_specs {
            store
                .create_card(
                    deck.id,
                    CardFields {
                        english: english.to_string(),
                        german: german.to_string(),
                        article: article.map(|a| a.to_string()),
                        ..CardFields::default()
                    },
                )
                .unwrap();
        }
        (store, deck.id)
    }

    #[test]
    fn test_start_rejects_empty_deck() {
        let (store, deck_id) = store_with_deck(&[]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(0);

        let result = session.start(
            &store,
            deck_id,
            StudyMode::Flashcard,
            5,
            Utc::now(),
            &mut rng,
        );
        assert!(matches!(result, Err(SessionError::EmptyDeck)));
        assert!(!session.is_active());
    }

    #[test]
    fn test_goal_shrinks_to_deck_size() {
        let (store, deck_id) = store_with_deck(&[
            ("cat", "Katze", Some("die")),
            ("dog", "Hund", Some("der")),
        ]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(0);

        session
            .start(&store, deck_id, StudyMode::Flashcard, 10, Utc::now(), &mut rng)
            .unwrap();
        assert_eq!(session.progress(), Some((0, 2)));
    }

    #[test]
    fn test_flashcard_session_runs_to_complete() {
        let (mut store, deck_id) = store_with_deck(&[
            ("cat", "Katze", Some("die")),
            ("dog", "Hund", Some("der")),
            ("bird", "Vogel", Some("der")),
        ]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(3);
        let now = Utc::now();

        session
            .start(&store, deck_id, StudyMode::Flashcard, 2, now, &mut rng)
            .unwrap();
        assert_eq!(session.progress(), Some((0, 2)));

        // Flip is repeatable and does not advance.
        session.flip();
        assert!(session.flipped());
        session.flip();
        assert!(!session.flipped());
        assert_eq!(session.progress(), Some((0, 2)));

        let first = session.current().unwrap().clone();
        let outcome = session.grade(&mut store, Grade::Good, now).unwrap();
        assert_eq!(outcome, GradeOutcome::Next);
        assert_eq!(session.progress(), Some((1, 2)));
        // Transient state resets for the next card.
        assert!(!session.flipped());

        let outcome = session.grade(&mut store, Grade::Good, now).unwrap();
        assert_eq!(outcome, GradeOutcome::Finished);
        assert!(session.is_complete());
        assert!(session.current().is_none());
        assert_eq!(session.summary().unwrap().done, 2);

        // The graded review state was persisted.
        let persisted = store.get_card(first.id).unwrap();
        assert_eq!(persisted.srs.reps, 1);
        assert_eq!(persisted.srs.interval_days, 1.0);
    }

    #[test]
    fn test_gender_quiz_requires_answer_before_grade() {
        let (mut store, deck_id) = store_with_deck(&[("cat", "Katze", Some("die"))]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(0);
        let now = Utc::now();

        session
            .start(&store, deck_id, StudyMode::GenderQuiz, 1, now, &mut rng)
            .unwrap();

        // Grading before answering is a rejected no-op.
        let outcome = session.grade(&mut store, Grade::Good, now).unwrap();
        assert_eq!(outcome, GradeOutcome::NotAnswered);
        assert!(session.is_active());
        assert_eq!(session.progress(), Some((0, 1)));
        let card_id = session.current().unwrap().id;
        assert_eq!(store.get_card(card_id).unwrap().srs.reps, 0);

        session.answer_gender(Article::Die);
        assert!(session.answered());
        assert!(session.correct());

        let outcome = session.grade(&mut store, Grade::Good, now).unwrap();
        assert_eq!(outcome, GradeOutcome::Finished);
        assert_eq!(store.get_card(card_id).unwrap().srs.reps, 1);
    }

    #[test]
    fn test_gender_quiz_reanswer_overwrites() {
        let (store, deck_id) = store_with_deck(&[("cat", "Katze", Some("die"))]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(0);

        session
            .start(&store, deck_id, StudyMode::GenderQuiz, 1, Utc::now(), &mut rng)
            .unwrap();

        session.answer_gender(Article::Der);
        assert!(!session.correct());
        session.answer_gender(Article::Die);
        assert!(session.correct());
    }

    #[test]
    fn test_gender_quiz_reveal_without_answer_is_incorrect() {
        let (store, deck_id) = store_with_deck(&[("cat", "Katze", Some("die"))]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(0);

        session
            .start(&store, deck_id, StudyMode::GenderQuiz, 1, Utc::now(), &mut rng)
            .unwrap();

        session.reveal();
        assert!(session.answered());
        assert!(!session.correct());
    }

    #[test]
    fn test_gender_quiz_reveal_after_answer_keeps_result() {
        let (store, deck_id) = store_with_deck(&[("cat", "Katze", Some("die"))]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(0);

        session
            .start(&store, deck_id, StudyMode::GenderQuiz, 1, Utc::now(), &mut rng)
            .unwrap();

        session.answer_gender(Article::Die);
        session.reveal();
        assert!(session.correct());
    }

    #[test]
    fn test_gender_quiz_articleless_card_never_correct() {
        let (store, deck_id) = store_with_deck(&[("to run", "laufen", None)]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(0);

        session
            .start(&store, deck_id, StudyMode::GenderQuiz, 1, Utc::now(), &mut rng)
            .unwrap();

        session.answer_gender(Article::Der);
        assert!(session.answered());
        assert!(!session.correct());
    }

    #[test]
    fn test_restart_after_complete() {
        let (mut store, deck_id) = store_with_deck(&[("cat", "Katze", Some("die"))]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(0);
        let now = Utc::now();

        session
            .start(&store, deck_id, StudyMode::Flashcard, 1, now, &mut rng)
            .unwrap();
        session.grade(&mut store, Grade::Good, now).unwrap();
        assert!(session.is_complete());

        session
            .start(&store, deck_id, StudyMode::Flashcard, 1, now, &mut rng)
            .unwrap();
        assert!(session.is_active());
        assert_eq!(session.progress(), Some((0, 1)));
    }

    #[test]
    #[should_panic(expected = "flip() is only valid in flashcard mode")]
    fn test_flip_in_gender_quiz_panics() {
        let (store, deck_id) = store_with_deck(&[("cat", "Katze", Some("die"))]);
        let mut session = StudySession::new();
        let mut rng = StdRng::seed_from_u64(0);

        session
            .start(&store, deck_id, StudyMode::GenderQuiz, 1, Utc::now(), &mut rng)
            .unwrap();
        session.flip();
    }

    #[test]
    #[should_panic(expected = "outside an active session")]
    fn test_flip_while_idle_panics() {
        let mut session = StudySession::new();
        session.flip();
    }
}
