//! `datadesk tools`: show what the model is offered.

use std::path::Path;
use std::process::ExitCode;

use super::load_config;

pub fn run(config_path: Option<&Path>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let registry = datadesk_tools::default_registry(&config)?;

    println!("{}", serde_json::to_string_pretty(&registry.describe_all())?);
    Ok(ExitCode::SUCCESS)
}
