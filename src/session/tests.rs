use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::collections::BTreeMap;

use crate::bank::{Question, RawRecord};

fn raw(statement: &str, topic: &str, mock_exam: Option<&str>) -> RawRecord {
    RawRecord {
        statement: Some(json!(statement)),
        options: Some(json!({ "a": "yes", "b": "no", "c": "maybe" })),
        correct: Some(json!("a")),
        block: Some(json!("Block 2")),
        topic: Some(json!(topic)),
        mock_exam: mock_exam.map(|m| json!(m)),
    }
}

fn bank_with_topics(topics: &[(&str, usize)]) -> Bank {
    let mut records = Vec::new();
    for (topic, count) in topics {
        for i in 0..*count {
            records.push(raw(&format!("{} question {}", topic, i), topic, None));
        }
    }
    Bank::from_records(records)
}

fn question(statement: &str, correct: &str) -> Question {
    let options: BTreeMap<String, String> = ["a", "b", "c"]
        .iter()
        .map(|label| (label.to_string(), format!("option {}", label)))
        .collect();
    Question {
        statement: statement.to_owned(),
        options,
        correct: correct.to_owned(),
        block: "Block 2".to_owned(),
        topic: "A".to_owned(),
        mock_exam: None,
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(99)
}

#[test]
fn serves_every_question_before_repeating() {
    let bank = bank_with_topics(&[("A", 7)]);
    let scope = Scope::topics("Block 2", vec!["A"]);
    let mut session = Session::new();
    let mut rng = rng();

    let mut seen = HashSet::new();
    for _ in 0..7 {
        let attempt = session.begin_test(&bank, &scope, 1, &mut rng).unwrap();
        assert_eq!(attempt.len(), 1);
        assert!(seen.insert(attempt.items()[0].question.statement.clone()));
    }
    assert_eq!(seen.len(), 7);
    assert_eq!(session.used(&scope.key()).unwrap().len(), 7);
}

#[test]
fn recycles_the_scope_once_exhausted() {
    let bank = bank_with_topics(&[("A", 4)]);
    let scope = Scope::topics("Block 2", vec!["A"]);
    let mut session = Session::new();
    let mut rng = rng();

    for _ in 0..4 {
        session.begin_test(&bank, &scope, 1, &mut rng).unwrap();
    }
    let key = session
        .begin_test(&bank, &scope, 1, &mut rng)
        .unwrap()
        .items()[0]
        .question
        .key();
    let used = session.used(&scope.key()).unwrap();
    assert_eq!(used.len(), 1);
    assert!(used.contains(&key));
}

#[test]
fn clamps_the_count_to_the_pool() {
    let bank = bank_with_topics(&[("A", 5)]);
    let mut used = HashSet::new();
    let draw = sample(bank.questions(), 100, &mut used, &mut rng());
    assert_eq!(draw.questions.len(), 5);
    assert_eq!(draw.keys.len(), 5);
    let distinct: HashSet<_> = draw.keys.iter().collect();
    assert_eq!(distinct.len(), 5);
}

#[test]
fn draws_only_the_remaining_questions_before_recycling() {
    let bank = bank_with_topics(&[("A", 5)]);
    let mut used: HashSet<QuestionKey> = bank.questions()[..3].iter().map(Question::key).collect();
    let draw = sample(bank.questions(), 5, &mut used, &mut rng());
    assert_eq!(draw.questions.len(), 2);
    assert!(draw.keys.iter().all(|key| !used.contains(key)));
    assert_eq!(used.len(), 3);
}

#[test]
fn sample_leaves_merging_to_the_caller() {
    let bank = bank_with_topics(&[("A", 3)]);
    let mut used = HashSet::new();
    let draw = sample(bank.questions(), 2, &mut used, &mut rng());
    assert_eq!(draw.keys.len(), 2);
    assert!(used.is_empty());
}

#[test]
fn scopes_do_not_share_exhaustion() {
    let bank = bank_with_topics(&[("A", 3), ("B", 4)]);
    let scope_a = Scope::topics("Block 2", vec!["A"]);
    let scope_b = Scope::topics("Block 2", vec!["B"]);
    let mut session = Session::new();
    let mut rng = rng();

    session.begin_test(&bank, &scope_b, 2, &mut rng).unwrap();
    for _ in 0..4 {
        let attempt = session.begin_test(&bank, &scope_a, 1, &mut rng).unwrap();
        assert_eq!(attempt.items()[0].question.topic, "A");
    }
    assert_eq!(session.used(&scope_a.key()).unwrap().len(), 1);
    assert_eq!(session.used(&scope_b.key()).unwrap().len(), 2);

    let attempt = session.begin_test(&bank, &scope_b, 10, &mut rng).unwrap();
    assert_eq!(attempt.len(), 2);
    assert!(attempt.items().iter().all(|item| item.question.topic == "B"));
}

#[test]
fn no_selection_is_distinct_from_selecting_everything() {
    let bank = bank_with_topics(&[("A", 2), ("B", 2)]);
    let nothing_selected = Scope::topics("B2", Vec::<&str>::new());
    let everything_selected = Scope::topics("bloque 2", vec!["B", "A"]);
    assert_ne!(nothing_selected.key(), everything_selected.key());
    assert_eq!(nothing_selected.pool(&bank).len(), 4);
    assert_eq!(everything_selected.pool(&bank).len(), 4);
}

#[test]
fn topic_names_never_alias_another_scope() {
    let literal_all = Scope::topics("Block 2", vec!["ALL"]);
    let no_selection = Scope::topics("Block 2", Vec::<&str>::new());
    assert_ne!(literal_all.key(), no_selection.key());

    let piped = Scope::topics("Block 2", vec!["x|y"]);
    let pair = Scope::topics("Block 2", vec!["x", "y"]);
    assert_ne!(piped.key(), pair.key());

    let bank = bank_with_topics(&[("x|y", 1), ("x", 1), ("y", 1)]);
    let mut session = Session::new();
    let mut rng = StdRng::seed_from_u64(3);
    session.begin_test(&bank, &pair, 1, &mut rng).unwrap();
    session.begin_test(&bank, &piped, 1, &mut rng).unwrap();
    assert_eq!(session.used(&pair.key()).unwrap().len(), 1);
    assert_eq!(session.used(&piped.key()).unwrap().len(), 1);
}

#[test]
fn practice_scopes_are_tracked_separately() {
    let topics = Scope::topics("Block 2", vec!["A"]);
    let practice = Scope::practice("Block 2", vec!["A"]);
    assert_ne!(topics.key(), practice.key());
    assert_eq!(
        Scope::topics("block 2", vec!["A"]).key(),
        Scope::topics("B 2", vec![" A "]).key()
    );
}

#[test]
fn mock_exam_scope_filters_by_id() {
    let bank = Bank::from_records(vec![
        raw("first", "A", Some("Simulacro 1")),
        raw("second", "A", Some("Simulacro 2")),
        raw("third", "A", None),
    ]);
    let pool = Scope::mock_exam("Simulacro 2").pool(&bank);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].statement, "second");
    assert_eq!(Scope::All.pool(&bank).len(), 3);
}

#[test]
fn empty_scope_creates_no_attempt() {
    let bank = bank_with_topics(&[("A", 2)]);
    let scope = Scope::topics("Block 2", vec!["Z"]);
    let mut session = Session::new();
    let error = session.begin_test(&bank, &scope, 5, &mut rng()).unwrap_err();
    assert_eq!(error, SessionError::EmptyScope(scope.key()));
    assert!(session.current_test().is_err());
    assert!(session.used(&scope.key()).is_none());
}

#[test]
fn grades_answers_and_flags_unanswered_questions() {
    let mut attempt = TestAttempt::new(
        Scope::All,
        vec![question("one", "b"), question("two", "c"), question("three", "a")],
    );
    attempt.record(0, "b").unwrap();
    attempt.record(2, "a").unwrap();
    assert_eq!(grade(&attempt), Grade { correct: 2, total: 3 });

    let correction = Correction::from(attempt);
    let verdicts: Vec<&Verdict> = correction.items.iter().map(|(_, v)| v).collect();
    assert_eq!(
        verdicts,
        vec![&Verdict::Correct, &Verdict::Unanswered, &Verdict::Correct]
    );
}

#[test]
fn wrong_answers_differ_from_unanswered() {
    let mut attempt = TestAttempt::new(Scope::All, vec![question("one", "b"), question("two", "c")]);
    attempt.record(0, "A)").unwrap();
    let correction = Correction::from(attempt);
    assert_eq!(
        correction.items[0].1,
        Verdict::Wrong {
            selected: "a".to_owned()
        }
    );
    assert_eq!(correction.items[1].1, Verdict::Unanswered);
    assert_eq!(correction.grade.failures(), 2);
    assert_eq!(correction.grade.percentage(), 0.0);
}

#[test]
fn rejects_invalid_answers() {
    let bank = bank_with_topics(&[("A", 3)]);
    let mut session = Session::new();
    assert_eq!(session.answer(0, "a"), Err(SessionError::NoActiveTest));

    session.begin_test(&bank, &Scope::All, 2, &mut rng()).unwrap();
    assert_eq!(
        session.answer(2, "a"),
        Err(SessionError::PositionOutOfRange {
            position: 2,
            total: 2
        })
    );
    assert_eq!(
        session.answer(0, "z"),
        Err(SessionError::UnknownLabel {
            position: 0,
            label: "z".to_owned()
        })
    );
    assert!(session.answer(0, "B").is_ok());
    assert!(session.answer(0, "c").is_ok());
    assert_eq!(session.progress(), Ok((1, 2)));
    assert!(session.clear_answer(0).is_ok());
    assert_eq!(session.progress(), Ok((0, 2)));
}

#[test]
fn finish_moves_to_results() {
    let bank = bank_with_topics(&[("A", 3)]);
    let mut session = Session::new();
    assert_eq!(session.finish().unwrap_err(), SessionError::NoActiveTest);
    assert!(matches!(session.phase(), Phase::Setup));

    session.begin_test(&bank, &Scope::All, 3, &mut rng()).unwrap();
    session.answer(1, "a").unwrap();
    let correction = session.finish().unwrap();
    assert_eq!(correction.grade, Grade { correct: 1, total: 3 });
    assert_eq!(session.results(), Some(&correction));
    assert!(session.current_test().is_err());
    assert_eq!(session.finish().unwrap_err(), SessionError::NoActiveTest);
    assert!(session.results().is_some());
}

#[test]
fn reset_forgets_served_questions_but_abandon_does_not() {
    let bank = bank_with_topics(&[("A", 3)]);
    let mut session = Session::new();
    session.begin_test(&bank, &Scope::All, 2, &mut rng()).unwrap();

    session.abandon();
    assert_eq!(session.used(&Scope::All.key()).unwrap().len(), 2);
    assert!(matches!(session.phase(), Phase::Setup));

    session.reset();
    assert!(session.used(&Scope::All.key()).is_none());
}
