use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

/// Plays a room conversation blob non-interactively and prints each page
/// and choice set to stdout.
#[derive(Parser, Debug)]
#[command(about = "Play back a room conversation blob", version)]
pub struct Args {
    /// Path to the conversation blob
    pub convo: PathBuf,

    /// Comma-separated selection script, one index per branch point
    /// (e.g. `0,2,1`)
    #[arg(long)]
    pub choices: Option<String>,

    /// Pick the first enabled choice whenever the script runs out
    #[arg(long)]
    pub auto: bool,

    /// Path to write the conversation transcript as JSON
    #[arg(long)]
    pub transcript_json: Option<PathBuf>,
}

impl Args {
    pub fn selection_script(&self) -> Result<Vec<usize>> {
        let Some(raw) = self.choices.as_deref() else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            bail!("--choices was given but is empty");
        }
        raw.split(',')
            .map(|part| {
                part.trim()
                    .parse::<usize>()
                    .with_context(|| format!("parsing choice index '{part}'"))
            })
            .collect()
    }
}

pub fn parse() -> Args {
    Args::parse()
}
