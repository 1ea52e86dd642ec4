use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid name uri: {0}")]
    InvalidUri(String),

    #[error("invalid percent escape at byte {offset}")]
    InvalidEscape { offset: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("decode error: {0}")]
    Decode(String),
}
