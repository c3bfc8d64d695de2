//! Engine error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The item carries no usable search criteria and no direct URL.
    /// This is the only failure surfaced to callers as a hard error;
    /// everything else degrades to a partial or empty outcome.
    #[error("item has no usable search criteria and no URL")]
    InvalidItem,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
