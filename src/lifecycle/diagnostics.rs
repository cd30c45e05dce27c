//! Plan diagnostics
//!
//! A failed plan is reported to the operator as a [`Diagnostic`] attached to
//! the instance that failed. Error diagnostics block apply for that instance
//! only.

use serde::Serialize;

use crate::error::{PhaseError, Severity};

/// Summary line used for every sequencing failure.
pub const INVALID_PHASE: &str = "Invalid phase";

/// Operator-facing message attached to one resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Whether the diagnostic blocks apply
    pub severity: Severity,
    /// One-line summary
    pub summary: String,
    /// Full detail
    pub detail: String,
    /// Resource address the diagnostic belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    #[must_use]
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            address: None,
        }
    }

    /// Creates a warning diagnostic.
    #[must_use]
    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            address: None,
        }
    }

    /// Attaches a resource address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Returns `true` for error severity.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&PhaseError> for Diagnostic {
    fn from(err: &PhaseError) -> Self {
        Self::error(INVALID_PHASE, err.to_string())
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.summary)?;
        if let Some(address) = &self.address {
            write!(f, " (with {address})")?;
        }
        write!(f, ": {}", self.detail)
    }
}
