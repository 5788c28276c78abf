//! Server error type.

use std::io;

/// Errors raised while bringing the transport up.
///
/// Everything here is fatal: the engine refuses to start without its two
/// channels bound. Runtime I/O failures (client churn, broken pipes) are
/// swallowed per the publish contract and never surface as errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A listener could not bind its address.
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    /// The async runtime could not be created.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
