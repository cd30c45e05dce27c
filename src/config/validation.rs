//! Manifest validation
//!
//! Enforces the declared-configuration constraints the lifecycle relies on:
//! every phase list has at least one entry, no null or empty entries, and no
//! duplicates. Validation collects ALL issues rather than stopping at the
//! first.

use crate::config::loader::ConfigLimits;
use crate::config::schema::{ManifestFile, ResourceBlock};
use crate::error::{PhaseListError, Severity, ValidationIssue};
use crate::phase::{Phase, PhaseList};

/// Phase lists longer than this produce a warning.
pub const LONG_PHASE_LIST: usize = 64;

// ============================================================================
// Public API
// ============================================================================

/// Result of manifest validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Manifest validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a manifest and returns the result.
    pub fn validate(&mut self, manifest: &ManifestFile, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        if let Some(version) = &manifest.provider.version {
            if version.trim().is_empty() {
                self.add_error("provider.version", "Provider version cannot be empty");
            }
        }

        for (name, block) in &manifest.resources {
            self.validate_resource_name(name);
            self.validate_phases(name, block);
        }

        if manifest.resources.len() > limits.max_resources {
            self.add_error(
                "resources",
                &format!(
                    "Too many resources: {} (limit: {})",
                    manifest.resources.len(),
                    limits.max_resources
                ),
            );
        }

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_resource_name(&mut self, name: &str) {
        let path = format!("resources.{name}");
        if name.is_empty() {
            self.add_error(&path, "Resource name cannot be empty");
        } else if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            self.add_error(
                &path,
                "Resource name may only contain letters, digits, '_' and '-'",
            );
        }
    }

    fn validate_phases(&mut self, name: &str, block: &ResourceBlock) {
        let base = format!("resources.{name}.phases");

        let mut null_indices = Vec::new();
        for (index, entry) in block.phases.iter().enumerate() {
            if entry.is_none() {
                null_indices.push(index);
                self.add_error(&format!("{base}[{index}]"), "Phase cannot be null");
            }
        }

        let phases: Vec<Phase> = block
            .phases
            .iter()
            .map(|p| Phase::from(p.clone().unwrap_or_default()))
            .collect();

        for violation in PhaseList::violations(&phases) {
            match &violation {
                PhaseListError::Empty => self.add_error(&base, &violation.to_string()),
                PhaseListError::EmptyEntry { index } => {
                    // nulls already reported above
                    if !null_indices.contains(index) {
                        self.add_error(&format!("{base}[{index}]"), &violation.to_string());
                    }
                }
                PhaseListError::Duplicate { second, .. } => {
                    self.add_error(&format!("{base}[{second}]"), &violation.to_string());
                }
            }
        }

        if phases.len() > LONG_PHASE_LIST {
            self.add_warning(
                &base,
                &format!(
                    "Phase list is unusually long ({} > {LONG_PHASE_LIST} phases)",
                    phases.len()
                ),
            );
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ResourceBlock;

    fn limits() -> ConfigLimits {
        ConfigLimits {
            max_resources: 10,
            max_config_size: 1024,
        }
    }

    fn manifest(resources: &[(&str, Vec<Option<&str>>)]) -> ManifestFile {
        let mut file = ManifestFile::default();
        for (name, phases) in resources {
            file.resources.insert(
                (*name).to_string(),
                ResourceBlock {
                    phases: phases.iter().map(|p| p.map(str::to_string)).collect(),
                },
            );
        }
        file
    }

    #[test]
    fn test_validate_minimal() {
        let file = manifest(&[("rollout", vec![Some("prepare"), Some("ready")])]);
        let result = Validator::new().validate(&file, &limits());
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_empty_list() {
        let file = manifest(&[("rollout", vec![])]);
        let result = Validator::new().validate(&file, &limits());
        assert!(result.has_errors());
        assert_eq!(result.errors[0].path, "resources.rollout.phases");
    }

    #[test]
    fn test_validate_null_entry() {
        let file = manifest(&[("rollout", vec![Some("a"), None])]);
        let result = Validator::new().validate(&file, &limits());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "resources.rollout.phases[1]");
        assert!(result.errors[0].message.contains("null"));
    }

    #[test]
    fn test_validate_empty_entry() {
        let file = manifest(&[("rollout", vec![Some(""), Some("a")])]);
        let result = Validator::new().validate(&file, &limits());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "resources.rollout.phases[0]");
    }

    #[test]
    fn test_validate_duplicate() {
        let file = manifest(&[("rollout", vec![Some("a"), Some("b"), Some("a")])]);
        let result = Validator::new().validate(&file, &limits());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, "resources.rollout.phases[2]");
    }

    #[test]
    fn test_validate_bad_resource_name() {
        let file = manifest(&[("roll out", vec![Some("a")])]);
        let result = Validator::new().validate(&file, &limits());
        assert!(result.has_errors());
        assert_eq!(result.errors[0].path, "resources.roll out");
    }

    #[test]
    fn test_validate_too_many_resources() {
        let names: Vec<String> = (0..11).map(|i| format!("r{i}")).collect();
        let resources: Vec<(&str, Vec<Option<&str>>)> = names
            .iter()
            .map(|n| (n.as_str(), vec![Some("a")]))
            .collect();
        let result = Validator::new().validate(&manifest(&resources), &limits());
        assert!(result.errors.iter().any(|e| e.path == "resources"));
    }

    #[test]
    fn test_validate_long_list_warns() {
        let names: Vec<String> = (0..=LONG_PHASE_LIST).map(|i| format!("p{i}")).collect();
        let phases = names.iter().map(|n| Some(n.as_str())).collect();
        let result = Validator::new().validate(&manifest(&[("long", phases)]), &limits());
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let file = manifest(&[
            ("a", vec![]),
            ("b", vec![None, Some("x"), Some("x")]),
        ]);
        let result = Validator::new().validate(&file, &limits());
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_validate_empty_provider_version() {
        let mut file = manifest(&[("a", vec![Some("x")])]);
        file.provider.version = Some("  ".to_string());
        let result = Validator::new().validate(&file, &limits());
        assert_eq!(result.errors[0].path, "provider.version");
    }
}
