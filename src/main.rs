use anyhow::*;
use std::io::{self, BufRead};

use crate::app::{App, Flow};
use crate::output::console::ConsoleOutput;
use crate::settings::Settings;

mod app;
mod bank;
mod commands;
mod logging;
mod output;
mod session;
mod settings;

fn main() -> Result<()> {
    logging::init();

    let settings = Settings::load().context("Could not load settings")?;
    let sources = settings.sources();
    let mut app = App::new(settings, sources, ConsoleOutput::stdout());
    app.start();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Could not read from stdin")?;
        if app.handle_line(&line) == Flow::Quit {
            break;
        }
    }

    Ok(())
}
