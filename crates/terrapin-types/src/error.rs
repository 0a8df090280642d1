//! error types for terrapin-types.

use thiserror::Error;

/// errors that can occur in terrapin-types.
#[derive(Debug, Error)]
pub enum Error {
    /// data failed domain validation.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
