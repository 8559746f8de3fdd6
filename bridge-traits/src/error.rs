use thiserror::Error;

/// Failure surfaced by a bridge or port implementation.
///
/// The first four variants form the taxonomy every remote collaborator
/// reports in; callers decide how to recover based on the tag rather than
/// the message.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Credential missing, expired or insufficient for the resource.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The remote answered with a non-success, non-auth status.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request could not be built or sent.
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Response(String),

    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether this failure signals a credential problem.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BridgeError::Unauthorized(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
