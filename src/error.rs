//! Error types for setup-time operations.
//!
//! The render path never returns errors. Everything here is raised before
//! audio starts flowing: building the engine or preparing it for a stream.

use thiserror::Error;

/// Result type alias for engine setup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or preparing the engine.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sample rate is not a finite, positive number.
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    /// Maximum block size must be non-zero.
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),
}
