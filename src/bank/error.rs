use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("bank source `{name}` is malformed: {reason}")]
    MalformedSource { name: String, reason: String },
    #[error("bank source `{name}` does not exist")]
    MissingSource { name: String },
    #[error("could not read bank source `{name}`")]
    Io {
        name: String,
        #[source]
        error: io::Error,
    },
}

impl BankError {
    pub fn malformed<R: ToString>(name: &str, reason: R) -> Self {
        BankError::MalformedSource {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }
}
