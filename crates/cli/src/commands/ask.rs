//! `datadesk ask`: one question, one answer.

use std::path::Path;
use std::process::ExitCode;

use datadesk_agent::Outcome;
use datadesk_core::message::Transcript;

use super::{BUDGET_EXCEEDED_EXIT, build_agent, load_config};

pub async fn run(
    config_path: Option<&Path>,
    prompt: &str,
    transcript_path: Option<&Path>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let agent = build_agent(&config)?;

    let mut transcript = Transcript::new();
    let outcome = agent.run_conversation(prompt, &mut transcript).await?;

    println!("{}", outcome.text());

    if let Some(path) = transcript_path {
        write_transcript(path, &transcript)?;
        tracing::info!(path = %path.display(), messages = transcript.len(), "Transcript saved");
    }

    Ok(ExitCode::from(exit_status(&outcome)))
}

pub(crate) fn write_transcript(
    path: &Path,
    transcript: &Transcript,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(transcript)?;
    std::fs::write(path, json)
        .map_err(|e| format!("Failed to write transcript to {}: {e}", path.display()))?;
    Ok(())
}

pub(crate) fn exit_status(outcome: &Outcome) -> u8 {
    match outcome {
        Outcome::FinalAnswer(_) => 0,
        Outcome::BudgetExceeded { .. } => BUDGET_EXCEEDED_EXIT,
    }
}
