use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

use crate::Cli;

/// Inspector configuration: command-line flags over environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub response: PathBuf,
    pub reactions: Option<PathBuf>,
    pub json: bool,
    pub strict: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let reactions = match cli.reactions {
            Some(path) => Some(path),
            None => env::var_os("FLARUM_REACTIONS").map(PathBuf::from),
        };
        if let Some(path) = &reactions {
            anyhow::ensure!(
                path.is_file(),
                "Reaction catalog {} does not exist",
                path.display()
            );
        }

        let strict = match env::var("FLARUM_STRICT") {
            Ok(value) if !cli.strict => value
                .parse::<bool>()
                .context("FLARUM_STRICT must be true or false")?,
            _ => cli.strict,
        };

        Ok(Self {
            response: cli.response,
            reactions,
            json: cli.json,
            strict,
        })
    }
}
