//! Configuration module
//!
//! Loads and validates the `phaser.yaml` manifest that declares provider
//! settings and `sequential` resources with their phase lists.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
