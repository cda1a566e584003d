use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

use crate::bank::{Question, QuestionKey};

#[derive(Clone, Debug, Default)]
pub struct Draw {
    pub questions: Vec<Question>,
    pub keys: Vec<QuestionKey>,
}

/// Draws up to `count` questions the scope has not served yet.
///
/// Once every question of the pool is in `used`, the set is cleared and the whole
/// pool becomes available again. The caller merges the returned keys into `used`.
/// The effective count shrinks silently when fewer questions are available.
pub fn sample<R: Rng + ?Sized>(
    pool: &[Question],
    count: usize,
    used: &mut HashSet<QuestionKey>,
    rng: &mut R,
) -> Draw {
    let mut available: Vec<&Question> = pool
        .iter()
        .filter(|question| !used.contains(&question.key()))
        .collect();
    if available.is_empty() {
        debug!("Scope exhausted after {} questions, recycling", used.len());
        used.clear();
        available = pool.iter().collect();
    }

    let questions: Vec<Question> = available
        .choose_multiple(rng, count)
        .map(|question| (*question).clone())
        .collect();
    let keys = questions.iter().map(Question::key).collect();
    Draw { questions, keys }
}
