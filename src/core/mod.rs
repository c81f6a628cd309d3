//! # Core Module
//!
//! Configuration, typed errors and text helpers shared by every feature.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add text module with input normalization
//! - 1.1.0: Add typed DebateError
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod text;

// Re-export commonly used items
pub use config::{Config, DebateConfig, DEFAULT_CLOSING_INSTRUCTION, DEFAULT_DEBATE_ROUNDS};
pub use error::DebateError;
pub use text::{normalize_input, preview};
