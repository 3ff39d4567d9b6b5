//! Validate command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use hubcycle_core::{load_file, ConfigError};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to `images.json` or `images.yaml`
    pub file: PathBuf,
}

/// Runs the validate command.
///
/// Prints the canonical configuration as JSON when the file is valid.
///
/// # Errors
///
/// Returns an error if the file cannot be read, cannot be parsed, or fails
/// validation.
pub fn run(args: &ValidateArgs) -> Result<()> {
    info!(path = ?args.file, "Validating configuration");

    println!("hubcycle Configuration Validator");
    println!("================================");
    println!("File: {}", args.file.display());
    println!();

    let configuration = match load_file(&args.file) {
        Ok(configuration) => configuration,
        Err(ConfigError::Invalid(errors)) => {
            for error in errors.iter() {
                println!("✗ {error}");
            }
            anyhow::bail!("Configuration is invalid ({} error(s))", errors.len());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load {}", args.file.display()))
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&configuration).context("Failed to render configuration")?
    );
    println!();

    let patterns: usize = configuration.iter().map(|entry| entry.patterns.len()).sum();
    println!(
        "✓ {} image(s), {patterns} pattern(s) validated successfully",
        configuration.len()
    );
    Ok(())
}
