//! Error types for rsmark.
//!
//! The decode pipeline itself never fails; these errors come from the edges
//! (geometry construction, configuration files, command-line input).

use thiserror::Error;

/// Errors that can occur outside the decode pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading payloads or configuration files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image geometry with a non-positive or non-finite size
    #[error("Invalid geometry: {message}")]
    InvalidGeometry {
        /// Description of the geometry error
        message: String,
    },

    /// Configuration file written by a newer version
    #[error("Version mismatch: expected at most {expected}, found {found}")]
    VersionMismatch {
        /// Highest supported version
        expected: u32,
        /// Version found in the file
        found: u32,
    },

    /// Task type name that is not known
    #[error("Unknown task type: {name}")]
    UnknownTaskType {
        /// The name that failed to parse
        name: String,
    },

    /// Malformed command-line or configuration value
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem
        message: String,
    },
}

impl Error {
    /// Create an invalid geometry error with a message.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Create an unknown task type error.
    pub fn unknown_task_type(name: impl Into<String>) -> Self {
        Self::UnknownTaskType { name: name.into() }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
