use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device connection failed: {0}")]
    Connect(String),

    #[error("device call timed out after {0:?}")]
    Timeout(Duration),

    #[error("device rejected request: {0}")]
    Rejected(String),

    #[error("device session closed: {0}")]
    Disconnected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeviceError {
    /// Whether a retry on a later tick can reasonably be expected to succeed.
    ///
    /// A semantic rejection (unknown input, bad request shape) will keep
    /// failing until the configuration changes; everything else is a
    /// connectivity problem that may clear on its own.
    pub fn is_transient(&self) -> bool {
        !matches!(self, DeviceError::Rejected(_))
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;
