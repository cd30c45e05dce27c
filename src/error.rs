//! Error types for `phaser`
//!
//! One enum per concern, aggregated by [`PhaserError`] which also maps
//! every failure onto a process exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::phase::Phase;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `phaser` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// State store error (corrupt state file, unknown instance)
    pub const STATE_ERROR: i32 = 4;

    /// A plan was blocked by a phase error
    pub const PHASE_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `phaser` operations.
#[derive(Debug, Error)]
pub enum PhaserError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// State store error
    #[error(transparent)]
    State(#[from] StateError),

    /// Phase sequencing error
    #[error(transparent)]
    Phase(#[from] PhaseError),

    /// One or more instances could not be planned
    #[error("planning failed for {failed} resource instance(s)")]
    PlanFailed {
        /// Number of instances with blocking diagnostics
        failed: usize,
    },

    /// Invalid command-line usage that clap cannot express
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PhaserError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::State(_) | Self::Json(_) => ExitCode::STATE_ERROR,
            Self::Phase(_) | Self::PlanFailed { .. } => ExitCode::PHASE_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Phase Errors
// ============================================================================

/// Phase sequencing errors.
///
/// There is exactly one way sequencing can fail: the current phase is not a
/// member of the phase list it is being advanced through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    /// The current phase does not appear in the declared list
    #[error("phase {:?} not found in phases={}", phase.as_str(), format_phases(phases))]
    NotFound {
        /// The phase that was looked up
        phase: Phase,
        /// The full list it was looked up in
        phases: Vec<Phase>,
    },
}

impl PhaseError {
    /// Builds a [`PhaseError::NotFound`] from borrowed inputs.
    #[must_use]
    pub fn not_found(phase: &Phase, phases: &[Phase]) -> Self {
        Self::NotFound {
            phase: phase.clone(),
            phases: phases.to_vec(),
        }
    }
}

/// Renders a phase slice as `[a b c]`.
fn format_phases(phases: &[Phase]) -> String {
    let joined = phases
        .iter()
        .map(Phase::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{joined}]")
}

/// Violations of the [`PhaseList`](crate::phase::PhaseList) invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseListError {
    /// The list has no elements
    #[error("phase list must contain at least 1 element")]
    Empty,

    /// An element is the empty string
    #[error("phase at index {index} is empty")]
    EmptyEntry {
        /// Position of the empty entry
        index: usize,
    },

    /// An element appears more than once
    #[error("phase {:?} is duplicated at index {first} and {second}", phase.as_str())]
    Duplicate {
        /// The repeated phase
        phase: Phase,
        /// Index of the first occurrence
        first: usize,
        /// Index of the repeated occurrence
        second: usize,
    },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize_issues(errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set ({message})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Message supplied with the `${VAR:?message}` reference
        message: String,
    },
}

fn summarize_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "resources.rollout.phases[2]")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} at {}", self.severity, self.message, self.path)
    }
}

/// Severity level for validation issues and plan diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks loading or planning
    Error,
    /// Informational, does not block
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

// ============================================================================
// State Store Errors
// ============================================================================

/// Errors raised by the state store and state-manipulating commands.
#[derive(Debug, Error)]
pub enum StateError {
    /// The state file exists but could not be parsed
    #[error("corrupt state file {path}: {message}")]
    Corrupt {
        /// Path to the state file
        path: PathBuf,
        /// Parser error message
        message: String,
    },

    /// The state file was written by an incompatible format version
    #[error("unsupported state format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Version this build understands
        expected: u32,
    },

    /// Import target is already tracked in state
    #[error("resource '{name}' is already managed; remove it from state before importing")]
    AlreadyManaged {
        /// Resource name
        name: String,
    },

    /// Resource is not present in state
    #[error("resource '{name}' is not managed in state")]
    NotManaged {
        /// Resource name
        name: String,
    },

    /// Import target is not declared in the configuration
    #[error("resource '{name}' is not declared in configuration{}", suggestion_suffix(suggestion.as_deref()))]
    NotDeclared {
        /// Resource name
        name: String,
        /// Closest declared name, if any is similar enough
        suggestion: Option<String>,
    },
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `phaser` operations.
pub type Result<T> = std::result::Result<T, PhaserError>;

// ============================================================================
// Tests
// ============================================================================
