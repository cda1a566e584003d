use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use thiserror::Error;

use crate::bank::classification;

pub const LABEL_ALPHABET: [char; 4] = ['a', 'b', 'c', 'd'];

lazy_static! {
    static ref TRAILING_URL_REGEX: Regex =
        Regex::new(r"(?i)[\s(\[]*(?:https?://|www\.)\S*[)\]]*$").unwrap();
    static ref TRAILING_PAGINATION_REGEX: Regex = Regex::new(
        r"(?i)[\s|·-]*\b(?:p[áa]gina|page|p[áa]g\.)\s*\d+(?:\s*(?:de|of|/)\s*\d+)?[\s|·-]*$"
    )
    .unwrap();
    static ref TRAILING_PAGE_NUMBER_REGEX: Regex = Regex::new(r"\s+-\s*\d+\s*-$").unwrap();
    static ref TRAILING_FOOTER_REGEX: Regex = Regex::new(
        r"(?i)\s*(?:©\s*\d{4}|\b(?:todos los derechos reservados|all rights reserved|documento descargado|downloaded from)\b)[^\n]*$"
    )
    .unwrap();
}

/// Strips page footers, stray URLs and pagination markers from the end of a text.
/// A text that is nothing but boilerplate is kept as is, trimmed.
pub fn clean_text(text: &str) -> String {
    let trimmed = text.trim();
    let mut cleaned = trimmed.to_owned();
    loop {
        let mut next = cleaned.clone();
        for regex in [
            &*TRAILING_URL_REGEX,
            &*TRAILING_PAGINATION_REGEX,
            &*TRAILING_PAGE_NUMBER_REGEX,
            &*TRAILING_FOOTER_REGEX,
        ]
        .iter()
        {
            let stripped = regex.replace(&next, "").trim().to_owned();
            next = stripped;
        }
        if next.is_empty() {
            return trimmed.to_owned();
        }
        if next == cleaned {
            return cleaned;
        }
        cleaned = next;
    }
}

/// Reduces labels like `A)`, `b.` or `C` to their single lowercase letter.
/// Labels outside the alphabet pass through trimmed and lowercased.
pub fn normalize_label(label: &str) -> String {
    let label = label.trim().to_lowercase();
    match label.chars().next() {
        Some(first) if LABEL_ALPHABET.contains(&first) => first.to_string(),
        _ => label,
    }
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty())
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "enunciado")]
    pub statement: Option<Value>,
    #[serde(default, alias = "opciones")]
    pub options: Option<Value>,
    #[serde(default, alias = "correcta")]
    pub correct: Option<Value>,
    #[serde(default, alias = "bloque")]
    pub block: Option<Value>,
    #[serde(default, alias = "tema")]
    pub topic: Option<Value>,
    #[serde(
        default,
        rename = "mockExamId",
        alias = "mock_exam_id",
        alias = "mock_exam",
        alias = "simulacro"
    )]
    pub mock_exam: Option<Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordRejection {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("options are not a mapping")]
    OptionsNotMapping,
    #[error("statement is empty")]
    EmptyStatement,
    #[error("no usable options")]
    NoOptions,
    #[error("correct label `{0}` is not among the options")]
    CorrectNotInOptions(String),
}

/// Composite identity shared by deduplication and used-question tracking.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QuestionKey {
    statement: String,
    topic: String,
    block: String,
    options: Vec<(String, String)>,
    correct: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Question {
    pub statement: String,
    pub options: BTreeMap<String, String>,
    pub correct: String,
    pub block: String,
    pub topic: String,
    pub mock_exam: Option<String>,
}

impl Question {
    pub fn key(&self) -> QuestionKey {
        QuestionKey {
            statement: self.statement.to_lowercase(),
            topic: self.topic.to_lowercase(),
            block: self.block.to_lowercase(),
            options: self
                .options
                .iter()
                .map(|(label, text)| (label.clone(), text.clone()))
                .collect(),
            correct: self.correct.clone(),
        }
    }
}

impl TryFrom<RawRecord> for Question {
    type Error = RecordRejection;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let statement = raw
            .statement
            .as_ref()
            .and_then(text_from_value)
            .ok_or(RecordRejection::MissingField("statement"))?;
        let raw_options = raw
            .options
            .as_ref()
            .ok_or(RecordRejection::MissingField("options"))?;
        let correct = raw
            .correct
            .as_ref()
            .and_then(text_from_value)
            .ok_or(RecordRejection::MissingField("correct"))?;
        let raw_options = match raw_options {
            Value::Object(map) => map,
            _ => return Err(RecordRejection::OptionsNotMapping),
        };

        let statement = clean_text(&statement);
        if statement.is_empty() {
            return Err(RecordRejection::EmptyStatement);
        }

        let options: BTreeMap<String, String> = raw_options
            .iter()
            .filter_map(|(label, text)| {
                let text = clean_text(&text_from_value(text)?);
                if text.is_empty() {
                    None
                } else {
                    Some((normalize_label(label), text))
                }
            })
            .collect();
        if options.is_empty() {
            return Err(RecordRejection::NoOptions);
        }

        let correct = normalize_label(&correct);
        if !options.contains_key(&correct) {
            return Err(RecordRejection::CorrectNotInOptions(correct));
        }

        let block = non_empty(raw.block.as_ref().and_then(text_from_value));
        let topic = non_empty(raw.topic.as_ref().and_then(text_from_value));
        let mock_exam = non_empty(raw.mock_exam.as_ref().and_then(text_from_value));
        let (block, topic) =
            classification::classify(block.as_deref(), topic.as_deref(), mock_exam.as_deref());

        Ok(Question {
            statement,
            options,
            correct,
            block,
            topic,
            mock_exam,
        })
    }
}
