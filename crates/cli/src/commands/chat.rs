//! `datadesk chat`: interactive session over stdin.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use datadesk_core::message::Transcript;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{build_agent, load_config};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "goodbye"];

pub async fn run(config_path: Option<&Path>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let agent = build_agent(&config)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║          datadesk: Interactive Mode          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Tools:     {}", agent.tools().names().join(", "));
    println!("  Data:      {}", config.data.dir.display());
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut transcript = Transcript::new();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }
        if is_exit_word(input) {
            break;
        }

        eprint!("  ...");
        match agent.run_conversation(input, &mut transcript).await {
            Ok(outcome) => {
                eprint!("\r     \r");
                println!();
                for line in outcome.text().lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(ExitCode::SUCCESS)
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn is_exit_word(input: &str) -> bool {
    EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words_are_case_insensitive() {
        assert!(is_exit_word("exit"));
        assert!(is_exit_word("QUIT"));
        assert!(is_exit_word("Goodbye"));
        assert!(!is_exit_word("exit now"));
    }
}
