use core_import::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error(transparent)]
    Import(#[from] ImportError),
}

impl CoreError {
    /// The pipeline failure behind this error, if any.
    pub fn as_import(&self) -> Option<&ImportError> {
        match self {
            CoreError::Import(error) => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
