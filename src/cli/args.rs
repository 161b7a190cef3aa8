//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the trim command
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Video files, in output order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Seconds removed from the start of every video (default: 0)
    #[arg(long, allow_hyphen_values = true)]
    pub start_cut: Option<String>,

    /// Seconds removed from the end of every video (default: 0)
    #[arg(long, allow_hyphen_values = true)]
    pub end_cut: Option<String>,

    /// Base name of the outputs (default: trimmed)
    #[arg(long)]
    pub name: Option<String>,

    /// Also build the session archive
    #[arg(long)]
    pub archive: bool,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file path
    pub file: PathBuf,
}

/// Arguments naming an existing session
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Session identifier printed by `trim`
    #[arg(long)]
    pub session: String,
}
