//! `phaser` - Phase-sequencing state machine for plan/apply reconciliation
//!
//! A declared resource advances through an ordered list of named phases,
//! one step per plan/apply cycle. The pure transition function lives in
//! [`phase`], its plan/apply lifecycle in [`lifecycle`], and a file-backed
//! host loop in [`engine`].

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod phase;
pub mod state;
