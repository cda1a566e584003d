use anyhow::*;
use directories_next::BaseDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::bank::{BankSource, FileSource};

const CONFIG_PATH_VARIABLE: &str = "SELF_QUIZ_CONFIG";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub bank_path: PathBuf,
    pub supplementary_banks: Vec<PathBuf>,
    pub default_question_count: usize,
    pub min_question_count: usize,
    pub max_question_count: usize,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bank_path: PathBuf::from("preguntas.json"),
            supplementary_banks: Vec::new(),
            default_question_count: 30,
            min_question_count: 5,
            max_question_count: 100,
            seed: None,
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    let mut path = BaseDirs::new()?.config_dir().to_path_buf();
    path.push("self-quiz");
    path.push("settings.toml");
    Some(path)
}

impl Settings {
    /// Defaults, then the settings file, then environment overrides.
    pub fn load() -> Result<Settings> {
        let explicit_path = env::var_os(CONFIG_PATH_VARIABLE).map(PathBuf::from);
        let settings = match explicit_path.clone().or_else(default_config_path) {
            Some(path) if path.exists() => {
                debug!("Reading settings from {}", path.display());
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Could not read settings file {}", path.display()))?;
                Settings::from_toml(&text)
                    .with_context(|| format!("Could not parse settings file {}", path.display()))?
            }
            Some(path) if explicit_path.is_some() => {
                warn!("Settings file {} does not exist, using defaults", path.display());
                Settings::default()
            }
            _ => Settings::default(),
        };
        settings.with_overrides(|name| env::var(name).ok())
    }

    pub fn from_toml(text: &str) -> Result<Settings> {
        let settings: Settings = toml::from_str(text)?;
        Ok(settings)
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("SELF_QUIZ_BANK") {
            self.bank_path = PathBuf::from(path);
        }
        if let Some(count) = lookup("SELF_QUIZ_COUNT") {
            self.default_question_count = count
                .trim()
                .parse()
                .with_context(|| format!("SELF_QUIZ_COUNT is not a number: {}", count))?;
        }
        if let Some(seed) = lookup("SELF_QUIZ_SEED") {
            self.seed = Some(
                seed.trim()
                    .parse()
                    .with_context(|| format!("SELF_QUIZ_SEED is not a number: {}", seed))?,
            );
        }
        self.max_question_count = self.max_question_count.max(1);
        if self.min_question_count == 0 || self.min_question_count > self.max_question_count {
            self.min_question_count = 1;
        }
        self.default_question_count = self.clamp_count(self.default_question_count);
        Ok(self)
    }

    pub fn clamp_count(&self, count: usize) -> usize {
        count
            .max(self.min_question_count)
            .min(self.max_question_count)
    }

    pub fn sources(&self) -> Vec<Box<dyn BankSource>> {
        let mut sources: Vec<Box<dyn BankSource>> = vec![Box::new(FileSource::new(&self.bank_path))];
        for path in &self.supplementary_banks {
            sources.push(Box::new(FileSource::optional(path)));
        }
        sources
    }
}
