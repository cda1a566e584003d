use itertools::Itertools;
use parking_lot::Mutex;
use std::io::{self, Write};
use tracing::error;

use crate::bank::Question;
use crate::output::{Message, QuizOutput};
use crate::session::{TestAttempt, Verdict};

const HELP: &str = "Commands:
  bank                             show the bank size
  scopes                           list blocks, topics and mock exams
  scope all                        draw from the whole bank
  scope topics <block> [t1, t2]    draw from some topics of a block
  scope practice <block> [t1, t2]  same filter, tracked as practice
  scope mock <id>                  draw from one mock exam
  count <n>                        number of questions per test
  begin                            start a test
  show                             show the current test or correction
  answer <n> <label>               answer question n
  clear <n>                        remove the answer to question n
  finish                           grade the test
  repeat                           new random test with the same scope
  new                              back to setup
  reset                            forget every served question
  quit                             exit";

fn question_header(position: usize, question: &Question) -> String {
    match &question.mock_exam {
        Some(mock_exam) => format!("Question {} - {}", position + 1, mock_exam),
        None => format!("Question {}", position + 1),
    }
}

fn render_test(attempt: &TestAttempt) -> String {
    let mut text = String::new();
    for (position, item) in attempt.items().iter().enumerate() {
        text.push_str(&format!(
            "{}\n{}\n",
            question_header(position, &item.question),
            item.question.statement
        ));
        for (label, option) in &item.question.options {
            let marker = if item.selection.as_deref() == Some(label.as_str()) {
                "(*)"
            } else {
                "( )"
            };
            text.push_str(&format!("  {} {}) {}\n", marker, label, option));
        }
        text.push('\n');
    }
    let (answered, total) = attempt.progress();
    text.push_str(&format!("Answered: {}/{}", answered, total));
    text
}

fn render_correction(position: usize, question: &Question, verdict: &Verdict) -> String {
    let mut text = format!("{}\n{}\n", question_header(position, question), question.statement);
    if *verdict == Verdict::Unanswered {
        text.push_str("  ⚠️ Unanswered question.\n");
    }
    for (label, option) in &question.options {
        let mark = match verdict {
            _ if *label == question.correct => "✅",
            Verdict::Wrong { selected } if selected == label => "❌",
            _ => "◻️",
        };
        text.push_str(&format!("  {} {}) {}\n", mark, label, option));
    }
    text
}

pub fn interpret_message(message: &Message) -> String {
    match message {
        Message::AnswerRecorded(position, label) => {
            format!("Question {} answered with {}.", position + 1, label)
        }
        Message::AnswerCleared(position) => format!("Question {} cleared.", position + 1),
        Message::BackToSetup => "Back to setup. Use `begin` to start a new test.".to_owned(),
        Message::BankSummary(count) => format!("Current bank: {} questions.", count),
        Message::CountSelected(count) => format!("Tests will have {} questions.", count),
        Message::EmptyScope(scope) => format!("There are no questions for {}.", scope),
        Message::Error(reason) => format!("Error: {}", reason),
        Message::Goodbye => "Bye!".to_owned(),
        Message::Help => HELP.to_owned(),
        Message::Progress(answered, total) => format!("Answered: {}/{}", answered, total),
        Message::Results(correction) => {
            let grade = &correction.grade;
            let mut text = format!(
                "Result: {}/{} correct - {:.1}% | Failures: {}\n\n",
                grade.correct,
                grade.total,
                grade.percentage(),
                grade.failures()
            );
            text.push_str(
                &correction
                    .items
                    .iter()
                    .enumerate()
                    .map(|(position, (item, verdict))| {
                        render_correction(position, &item.question, verdict)
                    })
                    .join("\n"),
            );
            text
        }
        Message::ScopeList { blocks, mock_exams } => {
            let mut text = String::from("Blocks:\n");
            for (block, topics) in blocks {
                text.push_str(&format!("  {}\n", block));
                for topic in topics {
                    text.push_str(&format!("    - {}\n", topic));
                }
            }
            if !mock_exams.is_empty() {
                text.push_str(&format!("Mock exams: {}", mock_exams.iter().join(", ")));
            }
            text.trim_end().to_owned()
        }
        Message::ScopeSelected(scope) => format!("Scope set to {}.", scope),
        Message::SessionReset => "Session reset, every question is available again.".to_owned(),
        Message::TestBegins(scope, count) => {
            format!("Starting a test of {} questions from {}.", count, scope)
        }
        Message::TestView(attempt) => render_test(attempt),
    }
}

/// Writes every message as plain text, one block per message.
pub struct ConsoleOutput<W: Write> {
    writer: Mutex<W>,
}

impl ConsoleOutput<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleOutput::new(io::stdout())
    }
}

impl<W: Write> ConsoleOutput<W> {
    pub fn new(writer: W) -> Self {
        ConsoleOutput {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write> QuizOutput for ConsoleOutput<W> {
    fn say(&self, message: &Message) {
        let content = interpret_message(message);
        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{}\n", content).and_then(|_| writer.flush()) {
            error!("Could not write to console: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::session::{Correction, Scope};

    fn question(mock_exam: Option<&str>) -> Question {
        let options: BTreeMap<String, String> = vec![("b", "Madrid"), ("a", "Lisbon")]
            .into_iter()
            .map(|(label, text)| (label.to_owned(), text.to_owned()))
            .collect();
        Question {
            statement: "Capital of Spain?".to_owned(),
            options,
            correct: "b".to_owned(),
            block: "Block 1".to_owned(),
            topic: "unspecified".to_owned(),
            mock_exam: mock_exam.map(str::to_owned),
        }
    }

    #[test]
    fn shows_options_in_label_order_with_selection() {
        let mut attempt = TestAttempt::new(Scope::All, vec![question(Some("Simulacro 3"))]);
        attempt.record(0, "a").unwrap();
        let text = interpret_message(&Message::TestView(attempt));
        assert!(text.starts_with("Question 1 - Simulacro 3\nCapital of Spain?\n"));
        assert!(text.contains("  (*) a) Lisbon\n  ( ) b) Madrid\n"));
        assert!(text.ends_with("Answered: 1/1"));
    }

    #[test]
    fn marks_the_correction() {
        let mut attempt = TestAttempt::new(Scope::All, vec![question(None), question(None)]);
        attempt.record(0, "a").unwrap();
        let text = interpret_message(&Message::Results(Correction::from(attempt)));
        assert!(text.starts_with("Result: 0/2 correct - 0.0% | Failures: 2"));
        assert!(text.contains("❌ a) Lisbon"));
        assert!(text.contains("✅ b) Madrid"));
        assert_eq!(text.matches("⚠️ Unanswered question.").count(), 1);
    }

    #[test]
    fn writes_to_the_given_writer() {
        let output = ConsoleOutput::new(Vec::new());
        output.say(&Message::BankSummary(12));
        let written = String::from_utf8(output.writer.into_inner()).unwrap();
        assert_eq!(written, "Current bank: 12 questions.\n\n");
    }
}
