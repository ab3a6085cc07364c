use serde::Deserialize;
use thiserror::Error;

use crate::report::{render_report, Submission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Report,
    Json,
    Clipboard,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to encode submission: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),
}

/// Hands a validated submission to its destination.
pub fn handle_output(submission: &Submission, mode: OutputMode) -> Result<(), OutputError> {
    let generated = chrono::Local::now().naive_local();
    match mode {
        OutputMode::Report => {
            print!("{}", render_report(submission, generated));
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(submission)?);
        }
        OutputMode::Clipboard => {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(render_report(submission, generated))?;
            eprintln!("Test configuration copied to clipboard");
        }
    }
    log::info!("submission handed off as {:?}", mode);
    Ok(())
}
