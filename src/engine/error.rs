//! Error types for the Troupe engine
//!
//! The engine's error taxonomy is input-tolerance: malformed field text
//! degrades to the instruction's documented default and absent targets
//! degrade to logged no-ops, so commands never fail. The one fallible
//! surface is engine construction, which rejects unusable configurations.

use thiserror::Error;

/// Top-level engine error
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type using EngineError
pub type EngineResult<T> = std::result::Result<T, EngineError>;
