//! Unified error type for algopred.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No usable response: connect/timeout failure or an undecodable body.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The game API answered with a non-zero `code`.
    #[error("Game API error (code={code}): {msg}")]
    Api { code: i64, msg: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the failure warrants a delayed retry of the same request.
    ///
    /// Only transport failures are retried; HTTP and application-level
    /// failures skip the cycle.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
