//! Manifest schema
//!
//! Raw, as-written shape of `phaser.yaml` ([`ManifestFile`]) and the
//! validated form handed to the engine ([`Manifest`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lifecycle::{ResourceConfig, SequentialResource};

// ============================================================================
// Raw Schema
// ============================================================================

/// Top-level manifest as deserialized from YAML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestFile {
    /// Provider settings
    #[serde(default)]
    pub provider: ProviderBlock,

    /// Declared `sequential` resources keyed by name
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceBlock>,
}

/// `provider:` block.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderBlock {
    /// Version recorded in state; defaults to the crate version
    #[serde(default)]
    pub version: Option<String>,
}

/// One `resources.<name>:` block.
///
/// Entries are optional so that `null` can be reported as a validation
/// issue with a precise path instead of a parse error.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceBlock {
    /// Ordered phases to progress through
    pub phases: Vec<Option<String>>,
}

// ============================================================================
// Validated Form
// ============================================================================

/// Provider-wide configuration passed to the engine at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Provider version stamped into saved state
    pub version: String,
}

impl ProviderConfig {
    /// Provider type name, prefixed to resource type names.
    pub const TYPE_NAME: &'static str = "phaser";

    /// Creates a provider config with an explicit version.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Full resource address for a `sequential` instance, e.g.
    /// `phaser_sequential.rollout`.
    #[must_use]
    pub fn resource_address(name: &str) -> String {
        format!(
            "{}_{}.{name}",
            Self::TYPE_NAME,
            SequentialResource::TYPE_NAME
        )
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

/// Validated manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Provider configuration
    pub provider: ProviderConfig,
    /// Declared resources keyed by name
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl Manifest {
    /// Looks up a declared resource.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.get(name)
    }

    /// Suggests a declared name close to `input` for typo correction.
    ///
    /// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
    #[must_use]
    pub fn suggest_resource(&self, input: &str) -> Option<String> {
        self.resources
            .keys()
            .map(|name| (name, strsim::damerau_levenshtein(input, name)))
            .filter(|(_, dist)| *dist <= 3)
            .min_by_key(|(_, dist)| *dist)
            .map(|(name, _)| name.clone())
    }
}
