//! CLI commands and argument parsing.

pub mod run;
pub mod validate;

use clap::{Parser, Subcommand};

/// hubcycle - keeps Docker Hub repositories tidy by deleting old tags
#[derive(Parser)]
#[command(name = "hubcycle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub const fn default_filter(&self) -> &'static str {
        if self.debug {
            "hubcycle=debug"
        } else {
            "hubcycle=info"
        }
    }
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run one purge cycle
    Run(run::RunArgs),

    /// Validate a configuration file
    Validate(validate::ValidateArgs),

    /// Print version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "hubcycle",
            "run",
            "--dry-run",
            "--yaml",
            "--debug",
            "--config-dir",
            "/tmp/hubcycle",
        ])
        .unwrap();

        assert!(cli.debug);
        assert_eq!(cli.default_filter(), "hubcycle=debug");
        match cli.command {
            Commands::Run(args) => {
                assert!(args.dry_run);
                assert!(args.yaml);
                assert_eq!(args.config_dir, PathBuf::from("/tmp/hubcycle"));
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["hubcycle", "run"]).unwrap();

        assert!(!cli.debug);
        assert_eq!(cli.default_filter(), "hubcycle=info");
        match cli.command {
            Commands::Run(args) => {
                assert!(!args.dry_run);
                assert!(!args.yaml);
                assert_eq!(args.timeout, 30);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from(["hubcycle", "validate", "images.yaml"]).unwrap();
        match cli.command {
            Commands::Validate(args) => assert_eq!(args.file, PathBuf::from("images.yaml")),
            _ => panic!("Expected validate command"),
        }
    }

    #[test]
    fn test_validate_requires_file() {
        assert!(Cli::try_parse_from(["hubcycle", "validate"]).is_err());
    }
}
