use anyhow::*;

use crate::session::Scope;


#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Answer(usize, String),
    Bank,
    Begin,
    Clear(usize),
    Count(usize),
    Finish,
    Help,
    New,
    Quit,
    Repeat,
    Reset,
    Scope(Scope),
    Scopes,
    Show,
}

fn split_topics(topics: &str) -> Vec<&str> {
    topics
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn split_first(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.find(char::is_whitespace) {
        Some(index) => (&text[..index], text[index..].trim()),
        None => (text, ""),
    }
}

/// Positions are typed one-based and stored zero-based.
fn parse_position(text: &str) -> Result<usize> {
    let position: usize = text
        .parse()
        .with_context(|| format!("`{}` is not a question number", text))?;
    position
        .checked_sub(1)
        .context("Question numbers start at 1")
}

fn parse_scope(args: &str) -> Result<Scope> {
    let (kind, rest) = split_first(args);
    match kind.to_lowercase().as_str() {
        "all" => Ok(Scope::All),
        "topics" | "practice" => {
            let (block, topics) = split_first(rest);
            if block.is_empty() {
                return Err(anyhow!("Usage: scope {} <block> [topic, topic...]", kind));
            }
            let topics = split_topics(topics);
            if kind.eq_ignore_ascii_case("practice") {
                Ok(Scope::practice(block, topics))
            } else {
                Ok(Scope::topics(block, topics))
            }
        }
        "mock" => {
            if rest.is_empty() {
                return Err(anyhow!("Usage: scope mock <id>"));
            }
            Ok(Scope::mock_exam(rest))
        }
        _ => Err(anyhow!("Usage: scope all|topics|practice|mock ...")),
    }
}

pub fn parse(line: &str) -> Result<Command> {
    let (name, args) = split_first(line);
    let command = match name.to_lowercase().as_str() {
        "answer" => {
            let (position, label) = split_first(args);
            if label.is_empty() {
                return Err(anyhow!("Usage: answer <n> <label>"));
            }
            Command::Answer(parse_position(position)?, label.to_owned())
        }
        "bank" => Command::Bank,
        "begin" => Command::Begin,
        "clear" => Command::Clear(parse_position(args)?),
        "count" => Command::Count(
            args.parse()
                .with_context(|| format!("`{}` is not a question count", args))?,
        ),
        "finish" => Command::Finish,
        "help" | "?" => Command::Help,
        "new" => Command::New,
        "quit" | "exit" => Command::Quit,
        "repeat" => Command::Repeat,
        "reset" => Command::Reset,
        "scope" => Command::Scope(parse_scope(args)?),
        "scopes" => Command::Scopes,
        "show" => Command::Show,
        "" => return Err(anyhow!("Type `help` to list the commands")),
        other => return Err(anyhow!("Unknown command `{}`", other)),
    };
    Ok(command)
}
