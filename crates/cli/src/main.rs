//! datadesk command-line entry point.
//!
//! Commands:
//! - `ask`: answer one question and exit
//! - `chat`: interactive multi-turn session
//! - `tools`: print the tool schemas sent to the model
//! - `init`: write a default config file

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "datadesk",
    about = "Ask questions about your data, the weather and exchange rates",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.datadesk/config.toml)
    #[arg(short, long, global = true, env = "DATADESK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// The question
        prompt: String,

        /// Write the finished transcript to this file as JSON
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },

    /// Start an interactive session
    Chat,

    /// List the available tools and their schemas
    Tools,

    /// Write a default configuration file
    Init,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let code = match cli.command {
        Commands::Ask { prompt, transcript } => {
            commands::ask::run(config, &prompt, transcript.as_deref()).await?
        }
        Commands::Chat => commands::chat::run(config).await?,
        Commands::Tools => commands::tools::run(config)?,
        Commands::Init => commands::init::run(config)?,
    };

    Ok(code)
}
