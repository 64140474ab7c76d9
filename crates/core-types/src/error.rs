// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{field} = {value} is outside [0, 1]")]
    FractionOutOfRange { field: &'static str, value: f64 },

    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("Confidence threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

pub type Result<T> = std::result::Result<T, Error>;
