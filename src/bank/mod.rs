use itertools::Itertools;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::convert::TryFrom;
use std::path::Path;
use tracing::debug;

pub mod cache;
pub mod classification;
mod error;
pub mod question;
pub mod source;

pub use cache::BankCache;
pub use error::BankError;
pub use question::{Question, QuestionKey, RawRecord};
pub use source::{BankSource, FileSource, MemorySource, SourceVersion};


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BankFormat {
    Json,
    Csv,
}

impl BankFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("csv") => BankFormat::Csv,
            _ => BankFormat::Json,
        }
    }
}

#[derive(Deserialize)]
struct CsvRow {
    #[serde(default, alias = "enunciado")]
    statement: Option<String>,
    #[serde(default)]
    a: Option<String>,
    #[serde(default)]
    b: Option<String>,
    #[serde(default)]
    c: Option<String>,
    #[serde(default)]
    d: Option<String>,
    #[serde(default)]
    e: Option<String>,
    #[serde(default, alias = "correcta")]
    correct: Option<String>,
    #[serde(default, alias = "bloque")]
    block: Option<String>,
    #[serde(default, alias = "tema")]
    topic: Option<String>,
    #[serde(default, alias = "mockExamId", alias = "simulacro")]
    mock_exam: Option<String>,
}

impl From<CsvRow> for RawRecord {
    fn from(row: CsvRow) -> Self {
        let options: Map<String, Value> = vec![
            ("a", row.a),
            ("b", row.b),
            ("c", row.c),
            ("d", row.d),
            ("e", row.e),
        ]
        .into_iter()
        .filter_map(|(label, text)| Some((label.to_owned(), Value::String(text?))))
        .collect();
        RawRecord {
            statement: row.statement.map(Value::String),
            options: Some(Value::Object(options)),
            correct: row.correct.map(Value::String),
            block: row.block.map(Value::String),
            topic: row.topic.map(Value::String),
            mock_exam: row.mock_exam.map(Value::String),
        }
    }
}

fn parse_json_records(text: &str, name: &str) -> Result<Vec<RawRecord>, BankError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| BankError::malformed(name, e))?;
    let elements = match document {
        Value::Array(elements) => elements,
        _ => return Err(BankError::malformed(name, "top level is not a sequence")),
    };

    let mut records = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        if !element.is_object() {
            return Err(BankError::malformed(
                name,
                format!("record {} is not a mapping", index),
            ));
        }
        match serde_json::from_value::<RawRecord>(element) {
            Ok(record) => records.push(record),
            Err(e) => debug!("Skipping record {} of {}: {}", index, name, e),
        }
    }
    Ok(records)
}

fn parse_csv_records(text: &str, name: &str) -> Result<Vec<RawRecord>, BankError> {
    let mut csv_reader = csv::Reader::from_reader(text.as_bytes());
    let mut records = Vec::new();
    for row in csv_reader.deserialize() {
        let row: CsvRow = row.map_err(|e| BankError::malformed(name, e))?;
        records.push(row.into());
    }
    Ok(records)
}

/// The canonical collection: normalized, deduplicated questions in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bank {
    questions: Vec<Question>,
}

impl Bank {
    pub fn parse(bytes: &[u8], format: BankFormat, name: &str) -> Result<Bank, BankError> {
        let text = std::str::from_utf8(bytes).map_err(|e| BankError::malformed(name, e))?;
        let records = match format {
            BankFormat::Json => parse_json_records(text, name)?,
            BankFormat::Csv => parse_csv_records(text, name)?,
        };
        let record_count = records.len();
        let bank = Bank::from_records(records);
        debug!(
            "Loaded {} questions from {} ({} records)",
            bank.len(),
            name,
            record_count
        );
        Ok(bank)
    }

    pub fn from_records<I: IntoIterator<Item = RawRecord>>(records: I) -> Bank {
        let questions = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match Question::try_from(record) {
                Ok(question) => Some(question),
                Err(rejection) => {
                    debug!("Dropping record {}: {}", index, rejection);
                    None
                }
            });
        Bank::from_questions(questions)
    }

    /// Concatenates banks, keeping the first occurrence of every question.
    pub fn merge<'a, I: IntoIterator<Item = &'a Bank>>(banks: I) -> Bank {
        Bank::from_questions(
            banks
                .into_iter()
                .flat_map(|bank| bank.questions.iter().cloned()),
        )
    }

    fn from_questions<I: IntoIterator<Item = Question>>(questions: I) -> Bank {
        let mut seen = HashSet::new();
        let questions = questions
            .into_iter()
            .filter(|question| seen.insert(question.key()))
            .collect();
        Bank { questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn blocks(&self) -> Vec<&str> {
        self.questions
            .iter()
            .map(|q| q.block.as_str())
            .unique()
            .sorted()
            .collect()
    }

    pub fn topics(&self, block: &str) -> Vec<&str> {
        self.questions
            .iter()
            .filter(|q| q.block == block)
            .map(|q| q.topic.as_str())
            .unique()
            .sorted()
            .collect()
    }

    pub fn mock_exams(&self) -> Vec<&str> {
        self.questions
            .iter()
            .filter_map(|q| q.mock_exam.as_deref())
            .unique()
            .sorted()
            .collect()
    }
}
