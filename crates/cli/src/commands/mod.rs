pub mod ask;
pub mod chat;
pub mod init;
pub mod tools;

use std::path::Path;
use std::sync::Arc;

use datadesk_agent::AgentLoop;
use datadesk_config::AppConfig;
use datadesk_providers::AnthropicProvider;

/// Exit status when a conversation hits its iteration limit.
pub const BUDGET_EXCEEDED_EXIT: u8 = 2;

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load(path).map_err(|e| format!("Failed to load config: {e}").into())
}

/// Wire provider, tools and settings into an agent loop.
pub fn build_agent(config: &AppConfig) -> Result<AgentLoop, Box<dyn std::error::Error>> {
    if missing_api_key(config) {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    LLM_API_KEY       = 'sk-ant-...'");
        eprintln!("    ANTHROPIC_API_KEY = 'sk-ant-...'");
        eprintln!();
        eprintln!("  Or add api_key to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
    }

    let provider = AnthropicProvider::from_config(config)?;
    let tools = Arc::new(datadesk_tools::default_registry(config)?);

    Ok(AgentLoop::new(Arc::new(provider), &config.model, tools)
        .with_max_iterations(config.max_iterations)
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature)
        .with_system_prompt(config.system_prompt()))
}

/// True when no usable key is configured, including a blank one.
fn missing_api_key(config: &AppConfig) -> bool {
    config.require_api_key().is_err()
}
