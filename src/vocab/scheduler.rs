//! Spaced repetition scheduling
//!
//! A fixed deterministic transition function over a card's review
//! state. Three grades:
//! - Again: the word was forgotten; repetition progress resets and the
//!   card comes back within the same session window (six hours)
//! - Good: recalled; the interval grows by the ease factor
//! - Easy: recalled without effort; the interval grows faster and the
//!   ease factor rises

use chrono::{DateTime, Duration, Utc};

use super::models::ReviewState;

/// Minimum ease factor allowed
pub const MIN_EASE: f64 = 1.3;

/// Maximum ease factor allowed
pub const MAX_EASE: f64 = 3.0;

/// The learner's self-reported recall quality for one review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Again,
    Good,
    Easy,
}

fn clamp_ease(ease: f64) -> f64 {
    ease.clamp(MIN_EASE, MAX_EASE)
}

/// Convert a fractional day count to a duration at millisecond
/// precision.
fn days(interval: f64) -> Duration {
    Duration::milliseconds((interval * 86_400_000.0).round() as i64)
}

/// Compute the review state after grading a card.
///
/// Pure: `now` is an explicit input, never read from a clock, so the
/// transition is reproducible. The interval computation uses the
/// already-updated ease factor; `reps` is tested before it is
/// incremented.
pub fn transition(state: &ReviewState, grade: Grade, now: DateTime<Utc>) -> ReviewState {
    match grade {
        Grade::Again => {
            let ease = clamp_ease(state.ease - 0.20);
            ReviewState {
                due: now + days(0.25),
                interval_days: 0.25,
                ease,
                reps: 0,
                lapses: state.lapses + 1,
            }
        }
        Grade::Good => {
            let ease = clamp_ease(state.ease + 0.05);
            let interval_days = if state.reps == 0 {
                1.0
            } else {
                (state.interval_days * ease).max(1.0)
            };
            ReviewState {
                due: now + days(interval_days),
                interval_days,
                ease,
                reps: state.reps + 1,
                lapses: state.lapses,
            }
        }
        Grade::Easy => {
            let ease = clamp_ease(state.ease + 0.15);
            let interval_days = if state.reps == 0 {
                2.0
            } else {
                (state.interval_days * ease * 1.3).max(2.0)
            };
            ReviewState {
                due: now + days(interval_days),
                interval_days,
                ease,
                reps: state.reps + 1,
                lapses: state.lapses,
            }
        }
    }
}

/// The interval each grade would produce, for display next to the
/// grading buttons. Order: Again, Good, Easy.
pub fn preview_intervals(state: &ReviewState, now: DateTime<Utc>) -> [f64; 3] {
    [
        transition(state, Grade::Again, now).interval_days,
        transition(state, Grade::Good, now).interval_days,
        transition(state, Grade::Easy, now).interval_days,
    ]
}

/// Format an interval in days to a human-readable string
pub fn format_interval(interval_days: f64) -> String {
    if interval_days < 1.0 {
        let hours = (interval_days * 24.0).round().max(1.0) as i64;
        format!("{}h", hours)
    } else if interval_days < 7.0 {
        format!("{}d", interval_days.round() as i64)
    } else if interval_days < 30.0 {
        format!("{}w", (interval_days / 7.0).floor() as i64)
    } else if interval_days < 365.0 {
        format!("{}mo", (interval_days / 30.0).floor() as i64)
    } else {
        format!("{}y", (interval_days / 365.0).floor() as i64)
    }
}
