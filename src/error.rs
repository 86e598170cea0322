//! Error types
//!
//! The simulation itself is closed and infallible; errors only arise at the
//! boundary (digit input, settings parsing and file access).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClockError {
    #[error("digit {value} at position {position} is outside 0-9")]
    InvalidDigit { position: usize, value: u8 },
    #[error("{hour:02}:{minute:02} is not a valid time of day")]
    InvalidTime { hour: u32, minute: u32 },
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSettings { field: &'static str, reason: String },
    #[error("settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClockError>;
