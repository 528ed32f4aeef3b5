//! Quiz round selection.
//!
//! A round draws one question uniformly at random from the candidate set,
//! never repeating a question the player has already been served.

use std::collections::HashSet;

use rand::Rng;

use crate::db::QuestionRecord;

/// Which questions a quiz round draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCategory {
    All,
    /// Zero-based category index as sent by clients.
    Index(i64),
}

impl QuizCategory {
    /// Marker type clients send when no category is selected.
    pub const ALL_MARKER: &'static str = "click";

    pub fn from_request(kind: &str, index: Option<i64>) -> Self {
        match index {
            Some(index) if kind != Self::ALL_MARKER => QuizCategory::Index(index),
            _ => QuizCategory::All,
        }
    }
}

/// Picks one question whose id is not in `previous`, or `None` when every
/// candidate has already been served.
pub fn pick_question<R>(
    candidates: Vec<QuestionRecord>,
    previous: &[i64],
    rng: &mut R,
) -> Option<QuestionRecord>
where
    R: Rng + ?Sized,
{
    let seen: HashSet<i64> = previous.iter().copied().collect();
    let mut remaining: Vec<QuestionRecord> = candidates
        .into_iter()
        .filter(|q| !seen.contains(&q.id))
        .collect();

    if remaining.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..remaining.len());
    Some(remaining.swap_remove(index))
}
