use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::bank::{Bank, QuestionKey};

mod attempt;
mod error;
mod sampler;
mod scope;

pub use self::attempt::{grade, Correction, Grade, TestAttempt, Verdict};
pub use self::error::SessionError;
pub use self::sampler::sample;
pub use self::scope::{Scope, ScopeKey};

#[cfg(test)]
mod tests;

#[derive(Debug)]
pub enum Phase {
    Setup,
    Test(TestAttempt),
    Results(Correction),
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Test(_) => "test",
            Phase::Results(_) => "results",
        }
    }
}

/// Everything one user accumulates while taking tests: the current phase and,
/// per scope, which questions have already been served.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    used: HashMap<ScopeKey, HashSet<QuestionKey>>,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            phase: Phase::Setup,
            used: HashMap::new(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Default::default()
    }

    fn set_phase(&mut self, phase: Phase) {
        info!("Entering session phase: {}", phase.name());
        self.phase = phase;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Draws a new attempt for `scope`, replacing whatever was in progress.
    pub fn begin_test<R: Rng + ?Sized>(
        &mut self,
        bank: &Bank,
        scope: &Scope,
        count: usize,
        rng: &mut R,
    ) -> Result<&TestAttempt, SessionError> {
        let key = scope.key();
        let pool = scope.pool(bank);
        if pool.is_empty() {
            return Err(SessionError::EmptyScope(key));
        }

        let used = self.used.entry(key.clone()).or_insert_with(HashSet::new);
        let draw = sample(&pool, count, used, rng);
        used.extend(draw.keys);
        info!(
            "Drew {} of {} questions for scope {} ({} served)",
            draw.questions.len(),
            pool.len(),
            key,
            used.len()
        );

        self.set_phase(Phase::Test(TestAttempt::new(scope.clone(), draw.questions)));
        self.current_test()
    }

    pub fn current_test(&self) -> Result<&TestAttempt, SessionError> {
        match &self.phase {
            Phase::Test(attempt) => Ok(attempt),
            _ => Err(SessionError::NoActiveTest),
        }
    }

    pub fn answer(&mut self, position: usize, label: &str) -> Result<(), SessionError> {
        match &mut self.phase {
            Phase::Test(attempt) => attempt.record(position, label),
            _ => Err(SessionError::NoActiveTest),
        }
    }

    pub fn clear_answer(&mut self, position: usize) -> Result<(), SessionError> {
        match &mut self.phase {
            Phase::Test(attempt) => attempt.clear(position),
            _ => Err(SessionError::NoActiveTest),
        }
    }

    pub fn progress(&self) -> Result<(usize, usize), SessionError> {
        self.current_test().map(TestAttempt::progress)
    }

    /// Grades the test in progress and keeps its correction as the results phase.
    pub fn finish(&mut self) -> Result<Correction, SessionError> {
        let attempt = match std::mem::replace(&mut self.phase, Phase::Setup) {
            Phase::Test(attempt) => attempt,
            other => {
                self.phase = other;
                return Err(SessionError::NoActiveTest);
            }
        };
        let grade = grade(&attempt);
        info!("Graded test: {}/{} correct", grade.correct, grade.total);
        let correction = Correction::from(attempt);
        self.set_phase(Phase::Results(correction.clone()));
        Ok(correction)
    }

    pub fn results(&self) -> Option<&Correction> {
        match &self.phase {
            Phase::Results(correction) => Some(correction),
            _ => None,
        }
    }

    /// Returns to setup, keeping what each scope has already served.
    pub fn abandon(&mut self) {
        self.set_phase(Phase::Setup);
    }

    /// Returns to setup and forgets every served question.
    pub fn reset(&mut self) {
        self.used.clear();
        self.set_phase(Phase::Setup);
    }

    pub fn used(&self, key: &ScopeKey) -> Option<&HashSet<QuestionKey>> {
        self.used.get(key)
    }
}
