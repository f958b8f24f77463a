//! Error types for the word cloud pipeline.

use thiserror::Error;

use crate::models::Party;

pub type Result<T> = std::result::Result<T, CloudError>;

#[derive(Error, Debug, Clone)]
pub enum CloudError {
    /// One (party, month) pair could not be loaded or parsed.
    /// The aggregator skips these and keeps going.
    #[error("Topic data unavailable for {party}/{month}: {reason}")]
    DataUnavailable {
        party: Party,
        month: String,
        reason: String,
    },

    #[error("Invalid month identifier {value:?} (expected YYYY-MM)")]
    InvalidMonth { value: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl CloudError {
    pub fn data_unavailable(party: Party, month: impl ToString, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            party,
            month: month.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_month(value: impl Into<String>) -> Self {
        Self::InvalidMonth { value: value.into() }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// True when the failure only affects a single (party, month) pair.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. })
    }
}

impl From<serde_json::Error> for CloudError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CloudError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CloudError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}
