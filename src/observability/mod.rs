//! Observability module
//!
//! Logging and structured event infrastructure for plan and apply runs.

pub mod events;
pub mod logging;

pub use events::{Event, EventEmitter};
pub use logging::{LogFormat, init_logging};
