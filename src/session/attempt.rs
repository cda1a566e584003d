use crate::bank::question::normalize_label;
use crate::bank::Question;
use crate::session::{Scope, SessionError};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttemptItem {
    pub question: Question,
    pub selection: Option<String>,
}

/// Snapshot of the drawn questions together with the user's selections.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestAttempt {
    scope: Scope,
    items: Vec<AttemptItem>,
}

impl TestAttempt {
    pub fn new(scope: Scope, questions: Vec<Question>) -> Self {
        let items = questions
            .into_iter()
            .map(|question| AttemptItem {
                question,
                selection: None,
            })
            .collect();
        TestAttempt { scope, items }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn items(&self) -> &[AttemptItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Records (or overwrites) the selection at a zero-based position.
    pub fn record(&mut self, position: usize, label: &str) -> Result<(), SessionError> {
        let total = self.items.len();
        let item = self
            .items
            .get_mut(position)
            .ok_or(SessionError::PositionOutOfRange { position, total })?;
        let label = normalize_label(label);
        if !item.question.options.contains_key(&label) {
            return Err(SessionError::UnknownLabel { position, label });
        }
        item.selection = Some(label);
        Ok(())
    }

    pub fn clear(&mut self, position: usize) -> Result<(), SessionError> {
        let total = self.items.len();
        let item = self
            .items
            .get_mut(position)
            .ok_or(SessionError::PositionOutOfRange { position, total })?;
        item.selection = None;
        Ok(())
    }

    /// Returns (answered, total).
    pub fn progress(&self) -> (usize, usize) {
        let answered = self
            .items
            .iter()
            .filter(|item| item.selection.is_some())
            .count();
        (answered, self.items.len())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Grade {
    pub correct: usize,
    pub total: usize,
}

impl Grade {
    /// Wrong and unanswered questions together.
    pub fn failures(&self) -> usize {
        self.total - self.correct
    }

    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 * 100.0 / self.total as f64
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    Correct,
    Wrong { selected: String },
    Unanswered,
}

impl Verdict {
    fn of(item: &AttemptItem) -> Self {
        match &item.selection {
            None => Verdict::Unanswered,
            Some(selected) if *selected == item.question.correct => Verdict::Correct,
            Some(selected) => Verdict::Wrong {
                selected: selected.clone(),
            },
        }
    }
}

pub fn grade(attempt: &TestAttempt) -> Grade {
    let correct = attempt
        .items
        .iter()
        .filter(|item| Verdict::of(item) == Verdict::Correct)
        .count();
    Grade {
        correct,
        total: attempt.items.len(),
    }
}

/// Graded view of a finished attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Correction {
    pub scope: Scope,
    pub grade: Grade,
    pub items: Vec<(AttemptItem, Verdict)>,
}

impl From<TestAttempt> for Correction {
    fn from(attempt: TestAttempt) -> Self {
        let grade = grade(&attempt);
        let items = attempt
            .items
            .into_iter()
            .map(|item| {
                let verdict = Verdict::of(&item);
                (item, verdict)
            })
            .collect();
        Correction {
            scope: attempt.scope,
            grade,
            items,
        }
    }
}
