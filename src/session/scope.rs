use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

use crate::bank::classification::{normalize_block, normalize_block_1_topic, BLOCK_1};
use crate::bank::{Bank, Question};

const ALL_TOPICS_MARKER: &str = "ALL";

/// Identifies the used-question state of one scope.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ScopeKey(Scope);

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Scope::All => write!(f, "all"),
            Scope::Topics { block, topics } => {
                write!(f, "topics:{}:{}", block, selection_key(topics))
            }
            Scope::Practice { block, topics } => {
                write!(f, "practice:{}:{}", block, selection_key(topics))
            }
            Scope::MockExam(id) => write!(f, "mock:{}", id),
        }
    }
}

/// Filter that partitions the bank into the pool a test draws from.
/// `topics: None` means no explicit selection, which is its own scope even
/// when an explicit selection happens to name every topic of the block.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Scope {
    All,
    Topics {
        block: String,
        topics: Option<BTreeSet<String>>,
    },
    Practice {
        block: String,
        topics: Option<BTreeSet<String>>,
    },
    MockExam(String),
}

fn normalize_selection<I, S>(block: &str, topics: I) -> Option<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let topics: BTreeSet<String> = topics
        .into_iter()
        .map(|topic| {
            if block == BLOCK_1 {
                normalize_block_1_topic(topic.as_ref())
            } else {
                topic.as_ref().trim().to_owned()
            }
        })
        .filter(|topic| !topic.is_empty())
        .collect();
    if topics.is_empty() {
        None
    } else {
        Some(topics)
    }
}

fn selection_key(topics: &Option<BTreeSet<String>>) -> String {
    match topics {
        None => ALL_TOPICS_MARKER.to_owned(),
        Some(topics) => topics.iter().join("|"),
    }
}

fn selection_matches(
    block: &str,
    topics: &Option<BTreeSet<String>>,
    question: &Question,
) -> bool {
    question.block == block
        && topics
            .as_ref()
            .map_or(true, |topics| topics.contains(&question.topic))
}

impl Scope {
    pub fn topics<I, S>(block: &str, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let block = normalize_block(block);
        let topics = normalize_selection(&block, topics);
        Scope::Topics { block, topics }
    }

    pub fn practice<I, S>(block: &str, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let block = normalize_block(block);
        let topics = normalize_selection(&block, topics);
        Scope::Practice { block, topics }
    }

    pub fn mock_exam(id: &str) -> Self {
        Scope::MockExam(id.trim().to_owned())
    }

    pub fn key(&self) -> ScopeKey {
        ScopeKey(self.clone())
    }

    pub fn matches(&self, question: &Question) -> bool {
        match self {
            Scope::All => true,
            Scope::Topics { block, topics } | Scope::Practice { block, topics } => {
                selection_matches(block, topics, question)
            }
            Scope::MockExam(id) => question.mock_exam.as_deref() == Some(id.as_str()),
        }
    }

    pub fn pool(&self, bank: &Bank) -> Vec<Question> {
        bank.questions()
            .iter()
            .filter(|question| self.matches(question))
            .cloned()
            .collect()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::All
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let describe_topics = |topics: &Option<BTreeSet<String>>| match topics {
            None => "all topics".to_owned(),
            Some(topics) => topics.iter().join(", "),
        };
        match self {
            Scope::All => write!(f, "whole bank"),
            Scope::Topics { block, topics } => write!(f, "{} ({})", block, describe_topics(topics)),
            Scope::Practice { block, topics } => {
                write!(f, "practice {} ({})", block, describe_topics(topics))
            }
            Scope::MockExam(id) => write!(f, "mock exam {}", id),
        }
    }
}
