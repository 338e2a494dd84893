//! # Error Types
//!
//! Defines error types used across crates.

use thiserror::Error;

/// Errors raised when decoding shared enumerations from raw values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Stage ordinal outside `0..=10`.
    #[error("Unknown stage ordinal: {0}")]
    UnknownStage(u8),
}
