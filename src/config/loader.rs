//! Manifest loader
//!
//! This module implements the loading pipeline:
//! 1. Size check and UTF-8 BOM stripping
//! 2. Environment variable expansion (pre-parse, on raw text)
//! 3. YAML parsing
//! 4. Validation
//! 5. Conversion into the typed [`Manifest`]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::schema::{Manifest, ManifestFile, ProviderConfig};
use crate::config::validation::Validator;
use crate::error::ConfigError;
use crate::lifecycle::ResourceConfig;
use crate::phase::PhaseList;

// ============================================================================
// Public API
// ============================================================================

/// Limits for manifest size to prevent resource exhaustion.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum number of declared resources.
    pub max_resources: usize,

    /// Maximum manifest file size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_resources: env_or("PHASER_MAX_RESOURCES", 1000),
            max_config_size: env_or("PHASER_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a manifest.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated manifest.
    pub manifest: Manifest,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during manifest loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {location}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Manifest loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    limits: ConfigLimits,
}

impl ConfigLoader {
    /// Creates a loader with the given limits.
    #[must_use]
    pub const fn new(limits: ConfigLimits) -> Self {
        Self { limits }
    }

    /// Loads and validates a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - Environment substitution fails
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > self.limits.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {} bytes", self.limits.max_config_size),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        debug!(path = %path.display(), bytes = raw.len(), "loading manifest");
        self.load_str(&raw, path)
    }

    /// Loads and validates manifest text. `path` is used for messages only.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], minus file access.
    pub fn load_str(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw, path)?;
        warnings.extend(env_sub.warnings);

        let value: serde_yaml::Value =
            serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        if value.is_null() {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: "Configuration file is empty".to_string(),
            });
        }

        let file: ManifestFile =
            serde_yaml::from_value(value).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: format!("Failed to deserialize configuration: {e}"),
            })?;

        let result = Validator::new().validate(&file, &self.limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        for issue in result.warnings {
            warn!(path = %issue.path, "{}", issue.message);
            warnings.push(LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            });
        }

        Ok(LoadResult {
            manifest: into_manifest(file)?,
            warnings,
        })
    }
}

/// Converts a validated raw manifest into its typed form.
fn into_manifest(file: ManifestFile) -> Result<Manifest, ConfigError> {
    let provider = file
        .provider
        .version
        .map_or_else(ProviderConfig::default, ProviderConfig::new);

    let mut resources = BTreeMap::new();
    for (name, block) in file.resources {
        let raw: Vec<String> = block.phases.into_iter().flatten().collect();
        let phases = PhaseList::try_from(raw).map_err(|e| ConfigError::InvalidValue {
            field: format!("resources.{name}.phases"),
            value: e.to_string(),
            expected: "a non-empty list of unique phase names".to_string(),
        })?;
        resources.insert(name, ResourceConfig::new(phases));
    }

    Ok(Manifest {
        provider,
        resources,
    })
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text BEFORE parsing to preserve type inference.
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw YAML text.
    ///
    /// Supports:
    /// - `${VAR}` - expand to value (empty string if unset with warning)
    /// - `${VAR:-default}` - expand to default if unset
    /// - `${VAR:?message}` - fail if unset
    /// - `$$` - literal `$`
    fn substitute(&mut self, raw: &str, source_path: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let spec = Self::read_spec(&mut chars, source_path)?;
                    self.expand(&spec, source_path, &mut result)?;
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    /// Reads everything up to the matching `}`.
    fn read_spec(
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
        source_path: &Path,
    ) -> Result<String, ConfigError> {
        let mut spec = String::new();
        let mut depth = 1;

        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(spec);
                    }
                }
                _ => {}
            }
            spec.push(c);
        }

        Err(ConfigError::ParseError {
            path: PathBuf::from(source_path),
            line: None,
            message: format!("Unclosed environment variable reference: ${{{spec}"),
        })
    }

    fn expand(
        &mut self,
        spec: &str,
        source_path: &Path,
        out: &mut String,
    ) -> Result<(), ConfigError> {
        let (name, fallback) = match spec.split_once(':') {
            Some((name, rest)) => (name, Some(rest)),
            None => (spec, None),
        };

        if let Ok(value) = std::env::var(name) {
            out.push_str(&value);
            return Ok(());
        }

        if let Some(default) = fallback.and_then(|rest| rest.strip_prefix('-')) {
            out.push_str(default);
        } else if let Some(message) = fallback.and_then(|rest| rest.strip_prefix('?')) {
            return Err(ConfigError::EnvVarNotSet {
                var: name.to_string(),
                message: message.to_string(),
            });
        } else {
            self.warnings.push(LoadWarning {
                message: format!("Environment variable '{name}' is not set, using empty string"),
                location: Some(source_path.display().to_string()),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
