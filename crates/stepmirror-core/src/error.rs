//! Error types for the StepMirror core.
//!
//! Missing or low-confidence landmark data is an expected condition and
//! degrades to defined zero values rather than surfacing here; the variants
//! below cover genuine caller contract violations and boundary failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("out-of-order timestamp: {received_ms}ms arrived after {previous_ms}ms")]
    OutOfOrderTimestamp { previous_ms: i64, received_ms: i64 },

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
