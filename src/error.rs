//! Error types

use thiserror::Error;

/// Failure of an ISAPI request other than decoding
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("Request failed: {0}")]
    Transport(String),
}

/// Credential store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record saved under this name
    #[error("camera '{0}' not found")]
    NotFound(String),

    /// Underlying storage failed
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Record exists but does not hold host, port, username and password
    #[error("camera '{name}' is malformed: {reason}")]
    Malformed { name: String, reason: String },

    /// Name cannot be used as a record key
    #[error("invalid camera name '{0}'")]
    InvalidName(String),
}

impl StoreError {
    /// True for every kind except NotFound
    pub fn is_storage(&self) -> bool {
        !matches!(self, StoreError::NotFound(_))
    }
}

/// Channel selection failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("invalid channel '{0}'")]
    InvalidChannel(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("no channels to acquire from")]
    NoChannels,
}

/// Display surface failures, fatal at startup
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to create display window: {0}")]
    Window(#[from] eframe::Error),

    #[error("failed to prepare frame output: {0}")]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
}
