//! CLI argument definitions
//!
//! All Clap derive structs for `phaser` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Advance declared resources through ordered phases, one step per apply.
#[derive(Parser, Debug)]
#[command(name = "phaser", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "PHASER_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "PHASER_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what the next apply would change.
    Plan(PlanArgs),

    /// Plan and apply, advancing every instance by one phase.
    Apply(PlanArgs),

    /// Bind an existing phase to a declared resource.
    Import(ImportArgs),

    /// Inspect or edit stored state.
    State(StateCommand),

    /// Validate the manifest without touching state.
    Validate(ValidateArgs),

    /// Compute a single transition without any manifest or state.
    Next(NextArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Manifest and state file locations.
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Path to the YAML manifest.
    #[arg(short, long, default_value = "phaser.yaml", env = "PHASER_CONFIG")]
    pub config: PathBuf,

    /// Path to the JSON state file.
    #[arg(short, long, default_value = "phaser.state.json", env = "PHASER_STATE")]
    pub state: PathBuf,
}

/// Arguments for `plan` and `apply`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Manifest and state locations.
    #[command(flatten)]
    pub paths: PathArgs,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Write a JSONL event stream to this file.
    #[arg(long, env = "PHASER_EVENTS")]
    pub events: Option<PathBuf>,
}

/// Arguments for `import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Declared resource name.
    pub name: String,

    /// Phase to import (any string is accepted).
    pub id: String,

    /// Manifest and state locations.
    #[command(flatten)]
    pub paths: PathArgs,

    /// Write a JSONL event stream to this file.
    #[arg(long, env = "PHASER_EVENTS")]
    pub events: Option<PathBuf>,
}

/// `state` command group.
#[derive(Args, Debug)]
pub struct StateCommand {
    /// State subcommand.
    #[command(subcommand)]
    pub subcommand: StateSubcommand,
}

/// State subcommands.
#[derive(Subcommand, Debug)]
pub enum StateSubcommand {
    /// Print stored state.
    Show(StateShowArgs),

    /// Stop tracking a resource.
    Rm(StateRmArgs),
}

/// Arguments for `state show`.
#[derive(Args, Debug)]
pub struct StateShowArgs {
    /// Show only this resource.
    pub name: Option<String>,

    /// Path to the JSON state file.
    #[arg(short, long, default_value = "phaser.state.json", env = "PHASER_STATE")]
    pub state: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `state rm`.
#[derive(Args, Debug)]
pub struct StateRmArgs {
    /// Resource name to remove.
    pub name: String,

    /// Path to the JSON state file.
    #[arg(short, long, default_value = "phaser.state.json", env = "PHASER_STATE")]
    pub state: PathBuf,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the YAML manifest.
    #[arg(short, long, default_value = "phaser.yaml", env = "PHASER_CONFIG")]
    pub config: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `next`.
#[derive(Args, Debug)]
pub struct NextArgs {
    /// Ordered, comma-separated phase list.
    #[arg(long, required = true, value_delimiter = ',')]
    pub phases: Vec<String>,

    /// Current phase.
    #[arg(long)]
    pub current: String,

    /// Wrap from the last phase back to the first.
    #[arg(long)]
    pub cyclic: bool,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Shared Enums
// ============================================================================

/// Output format for command results.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Human,
    /// JSON.
    Json,
}

/// Color output control.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Color when stderr is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Always color.
    Always,
    /// Never color.
    Never,
}
