use anyhow::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;

use crate::bank::question::normalize_label;
use crate::bank::{Bank, BankCache, BankSource};
use crate::commands::{self, Command};
use crate::output::{Message, QuizOutput};
use crate::session::{Phase, Scope, Session, SessionError};
use crate::settings::Settings;


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the session and threads it through every command.
pub struct App<O: QuizOutput> {
    settings: Settings,
    sources: Vec<Box<dyn BankSource>>,
    cache: BankCache,
    session: Session,
    scope: Scope,
    count: usize,
    rng: StdRng,
    output: O,
}

impl<O: QuizOutput> App<O> {
    pub fn new(settings: Settings, sources: Vec<Box<dyn BankSource>>, output: O) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        App {
            count: settings.default_question_count,
            settings,
            sources,
            cache: BankCache::new(),
            session: Session::new(),
            scope: Scope::default(),
            rng,
            output,
        }
    }

    pub fn start(&mut self) {
        let output = &self.output;
        let loaded = self.bank().map(|bank| {
            if bank.is_empty() {
                warn!("The question bank is empty");
            }
            output.say(&Message::BankSummary(bank.len()));
        });
        if let Err(e) = loaded {
            warn!("{:#}", e);
            self.output.say(&Message::Error(format!("{:#}", e)));
        }
        self.output.say(&Message::Help);
    }

    pub fn handle_line(&mut self, line: &str) -> Flow {
        let result = commands::parse(line).and_then(|command| self.execute(command));
        result.unwrap_or_else(|e| {
            self.output.say(&Message::Error(format!("{:#}", e)));
            Flow::Continue
        })
    }

    fn bank(&self) -> Result<Bank> {
        self.cache
            .load_all(&self.sources)
            .context("Could not load the question bank")
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Answer(position, label) => {
                self.session.answer(position, &label)?;
                let (answered, total) = self.session.progress()?;
                self.output.say(&Message::AnswerRecorded(
                    position,
                    normalize_label(&label),
                ));
                self.output.say(&Message::Progress(answered, total));
            }
            Command::Bank => {
                let bank = self.bank()?;
                self.output.say(&Message::BankSummary(bank.len()));
            }
            Command::Begin => self.begin_test()?,
            Command::Clear(position) => {
                self.session.clear_answer(position)?;
                self.output.say(&Message::AnswerCleared(position));
            }
            Command::Count(count) => {
                self.count = self.settings.clamp_count(count);
                self.output.say(&Message::CountSelected(self.count));
            }
            Command::Finish => {
                let correction = self.session.finish()?;
                self.output.say(&Message::Results(correction));
            }
            Command::Help => self.output.say(&Message::Help),
            Command::New => {
                self.session.abandon();
                self.output.say(&Message::BackToSetup);
            }
            Command::Quit => {
                self.output.say(&Message::Goodbye);
                return Ok(Flow::Quit);
            }
            Command::Repeat => {
                if let Some(correction) = self.session.results() {
                    self.scope = correction.scope.clone();
                }
                self.begin_test()?;
            }
            Command::Reset => {
                self.session.reset();
                self.output.say(&Message::SessionReset);
            }
            Command::Scope(scope) => {
                self.scope = scope;
                self.output.say(&Message::ScopeSelected(self.scope.clone()));
            }
            Command::Scopes => {
                let bank = self.bank()?;
                let blocks: Vec<(String, Vec<String>)> = bank
                    .blocks()
                    .into_iter()
                    .map(|block| {
                        let topics = bank.topics(block).into_iter().map(str::to_owned).collect();
                        (block.to_owned(), topics)
                    })
                    .collect();
                let mock_exams: Vec<String> =
                    bank.mock_exams().into_iter().map(str::to_owned).collect();
                self.output.say(&Message::ScopeList { blocks, mock_exams });
            }
            Command::Show => {
                let message = match self.session.phase() {
                    Phase::Test(attempt) => Message::TestView(attempt.clone()),
                    Phase::Results(correction) => Message::Results(correction.clone()),
                    Phase::Setup => return Err(anyhow!("No test in progress, use `begin`")),
                };
                self.output.say(&message);
            }
        }
        Ok(Flow::Continue)
    }

    fn begin_test(&mut self) -> Result<()> {
        let bank = self.bank()?;
        let attempt = match self
            .session
            .begin_test(&bank, &self.scope, self.count, &mut self.rng)
        {
            Err(SessionError::EmptyScope(_)) => {
                self.output.say(&Message::EmptyScope(self.scope.clone()));
                return Ok(());
            }
            drawn => drawn?.clone(),
        };
        self.output
            .say(&Message::TestBegins(self.scope.clone(), attempt.len()));
        self.output.say(&Message::TestView(attempt));
        Ok(())
    }
}
