//! Run command implementation.
//!
//! Loads the retention configuration, logs in to the registry and runs one
//! purge cycle.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use hubcycle_core::loader::DEFAULT_CONFIG_DIR;
use hubcycle_core::{CanonicalImageEntry, ConfigFormat, ConfigLoader, Environment};
use hubcycle_registry::{
    Credentials, DockerHubClient, PurgeSummary, Purger, RegistryConfig, DOCKER_HUB_URL,
};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Log deletions without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Read `images.yaml` instead of `images.json`
    #[arg(long)]
    pub yaml: bool,

    /// Directory holding the configuration file
    #[arg(long, env = "HUBCYCLE_CONFIG_DIR", default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Registry API URL
    #[arg(long, env = "HUBCYCLE_REGISTRY_URL", default_value = DOCKER_HUB_URL)]
    pub registry_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

impl RunArgs {
    fn loader(&self) -> ConfigLoader {
        let format = if self.yaml {
            ConfigFormat::Yaml
        } else {
            ConfigFormat::Json
        };
        ConfigLoader::new(&self.config_dir).with_format(format)
    }
}

/// Runs the run command.
///
/// # Errors
///
/// Returns an error if:
/// - Registry credentials are missing
/// - No valid configuration source is available
/// - Login to the registry fails
pub async fn run(args: &RunArgs) -> Result<()> {
    execute(args, &Environment::from_env()).await.map(|_| ())
}

async fn execute(args: &RunArgs, environment: &Environment) -> Result<PurgeSummary> {
    let (username, password) = environment.credentials().context(
        "Registry credentials are missing: set dockerhub.username and dockerhub.password",
    )?;

    let configuration = args
        .loader()
        .load(environment)
        .context("Failed to load configuration")?;

    println!("hubcycle");
    println!("========");
    if args.dry_run {
        println!("Mode: DRY-RUN (no tags will be deleted)");
    }
    println!();
    print_configuration(&configuration)?;

    let config = RegistryConfig::new(&args.registry_url)
        .with_timeout(Duration::from_secs(args.timeout));

    print!("Logging in to {} as {username}... ", config.url);
    let client = DockerHubClient::login(config, &Credentials::new(username, password))
        .await
        .context("Failed to log in to registry")?;
    println!("✓");
    println!();

    info!(
        images = configuration.len(),
        dry_run = args.dry_run,
        "Starting purge cycle"
    );
    let summary = Purger::new(client, args.dry_run)
        .purge_all(&configuration)
        .await;

    print_summary(&summary);
    Ok(summary)
}

fn print_configuration(configuration: &[CanonicalImageEntry]) -> Result<()> {
    println!("CONFIGURATION");
    println!(
        "{}",
        serde_json::to_string_pretty(configuration).context("Failed to render configuration")?
    );
    println!();
    Ok(())
}

fn print_summary(summary: &PurgeSummary) {
    println!("{}", render_summary(summary));
}

/// Renders the end-of-cycle report.
fn render_summary(summary: &PurgeSummary) -> String {
    let mut lines = vec!["DELETED TAGS".to_string()];

    if summary.success.is_empty() {
        lines.push("  none".to_string());
    } else {
        lines.extend(summary.success.iter().map(|tag| format!("  ✓ {tag}")));
    }

    if !summary.failure.is_empty() {
        lines.push(String::new());
        lines.push("FAILED TAGS".to_string());
        lines.extend(summary.failure.iter().map(|tag| format!("  ✗ {tag}")));
    }

    if summary.skipped > 0 {
        lines.push(String::new());
        lines.push(format!(
            "⚠ {} pattern(s) skipped because their tags could not be listed",
            summary.skipped
        ));
    }

    lines.join("\n")
}
