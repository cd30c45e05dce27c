//! State store
//!
//! The host engine owns persistence. Each resource instance's
//! [`ResourceState`](crate::lifecycle::ResourceState) lives in a single JSON
//! state file. The lifecycle controller only proposes values, and the engine
//! writes them here.

pub mod store;

pub use store::{FORMAT_VERSION, StateFile, StateStore};
