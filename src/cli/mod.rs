//! CLI module for trimx-batch
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::ConfigOverrides;
use crate::domain::model::TrimPolicy;

pub mod args;
pub mod commands;

/// trimx-batch
///
/// Trims a fixed amount from the start and end of every video in a batch,
/// keeping the results in a session that can be archived and cleaned up.
#[derive(Parser, Debug)]
#[command(name = "trimx-batch")]
#[command(about = "Batch video trimming with session-scoped outputs")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: config/trimx-batch.toml or trimx_batch.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Directory holding uploads, outputs and archives
    #[arg(long, global = true)]
    pub storage_root: Option<PathBuf>,

    /// Trim policy for this deployment (reencode, copy)
    #[arg(long, global = true, value_parser = parse_policy)]
    pub policy: Option<TrimPolicy>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Command-line layer of the configuration hierarchy
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            storage_root: self.storage_root.clone(),
            policy: self.policy,
            log_level: self.log_level.clone(),
            log_json: self.json_logs.then_some(true),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload videos into a new session and trim them
    Trim(args::TrimArgs),
    /// Print the duration of a media file
    Probe(args::ProbeArgs),
    /// Zip the outputs of a session
    Archive(args::SessionArgs),
    /// Remove every file of a session
    Cleanup(args::SessionArgs),
}

fn parse_policy(raw: &str) -> Result<TrimPolicy, String> {
    TrimPolicy::parse(raw).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_trim_arguments() {
        let cli = Cli::try_parse_from([
            "trimx-batch",
            "--policy",
            "copy",
            "trim",
            "a.mp4",
            "b.mov",
            "--start-cut",
            "1.5",
            "--name",
            "clip",
            "--archive",
        ])
        .unwrap();

        assert_eq!(cli.policy, Some(TrimPolicy::Copy));
        match cli.command {
            Commands::Trim(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.start_cut.as_deref(), Some("1.5"));
                assert_eq!(args.end_cut, None);
                assert_eq!(args.name.as_deref(), Some("clip"));
                assert!(args.archive);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides_leave_unset_values_alone() {
        let cli = Cli::try_parse_from(["trimx-batch", "cleanup", "--session", "x"]).unwrap();
        let overrides = cli.overrides();
        assert!(overrides.storage_root.is_none());
        assert!(overrides.policy.is_none());
        assert!(overrides.log_json.is_none());
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["trimx-batch", "--policy", "hybrid", "probe", "a.mp4"]).is_err());
    }
}
