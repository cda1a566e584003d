use thiserror::Error;

use crate::session::ScopeKey;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("there are no questions for scope `{0}`")]
    EmptyScope(ScopeKey),
    #[error("there is no test in progress")]
    NoActiveTest,
    #[error("question {position} does not exist, the test has {total} questions")]
    PositionOutOfRange { position: usize, total: usize },
    #[error("question {position} has no option `{label}`")]
    UnknownLabel { position: usize, label: String },
}
