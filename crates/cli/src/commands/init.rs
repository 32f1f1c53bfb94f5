//! `datadesk init`: write a starter config file.

use std::path::Path;
use std::process::ExitCode;

use datadesk_config::AppConfig;

pub fn run(config_path: Option<&Path>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);

    println!("datadesk setup");
    println!("==============\n");

    if write_default(&path)? {
        println!("✅ Created config file at: {}", path.display());
        println!("\nNext steps:");
        println!("  1. Set LLM_API_KEY (or add api_key to the file)");
        println!("  2. Point data.dir at the folder holding your CSV files");
        println!("  3. Run: datadesk ask \"How many engineers do we have?\"");
    } else {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete and re-run init.");
    }

    Ok(ExitCode::SUCCESS)
}

/// Write the default config to `path`. Returns `false` if a file is already there.
fn write_default(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}
