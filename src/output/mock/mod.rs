use parking_lot::RwLock;
use std::sync::Arc;

use crate::output::{Message, QuizOutput};

#[derive(Clone, Default)]
pub struct MockOutput {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MockOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn flush(&self) -> Vec<Message> {
        std::mem::replace(&mut *self.messages.write(), Vec::new())
    }

    pub fn contains_message(&self, message: &Message) -> bool {
        self.messages.read().iter().any(|m| m == message)
    }

    pub fn last_message(&self) -> Option<Message> {
        self.messages.read().last().cloned()
    }
}

impl QuizOutput for MockOutput {
    fn say(&self, message: &Message) {
        self.messages.write().push(message.clone());
    }
}
