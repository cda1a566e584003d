use crate::session::{Correction, Scope, TestAttempt};

pub mod console;
#[cfg(test)]
pub mod mock;

#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    AnswerRecorded(usize, String),
    AnswerCleared(usize),
    BackToSetup,
    BankSummary(usize),
    CountSelected(usize),
    EmptyScope(Scope),
    Error(String),
    Goodbye,
    Help,
    Progress(usize, usize),
    Results(Correction),
    ScopeList {
        blocks: Vec<(String, Vec<String>)>,
        mock_exams: Vec<String>,
    },
    ScopeSelected(Scope),
    SessionReset,
    TestBegins(Scope, usize),
    TestView(TestAttempt),
}

pub trait QuizOutput {
    fn say(&self, message: &Message);
}
