use bridge_traits::{BridgeError, SearchKey};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failure of one import stage.
///
/// Catalog and streaming credentials fail differently: a private catalog
/// resource is terminal, an expired streaming token calls for
/// re-authentication. The two unauthorized variants keep them apart.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Catalog resource is private or inaccessible: {0}")]
    CatalogUnauthorized(String),

    #[error("Streaming service authorization expired or missing: {0}")]
    StreamingUnauthorized(String),

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Malformed response: {0}")]
    Response(String),

    #[error("No entries found at the given URL")]
    EmptyResult,

    #[error("Import cancelled")]
    Cancelled,

    #[error("{failed} of {total} album lookups failed")]
    Lookup {
        failed: usize,
        total: usize,
        failures: Vec<LookupFailure>,
    },
}

/// One failed album lookup, tied back to its input position.
#[derive(Debug)]
pub struct LookupFailure {
    pub index: usize,
    pub key: SearchKey,
    pub error: BridgeError,
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} - {}: {}",
            self.index, self.key.artist, self.key.title, self.error
        )
    }
}

/// Copyable tag of an [`ImportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    CatalogUnauthorized,
    StreamingUnauthorized,
    UnexpectedStatus,
    Request,
    Response,
    EmptyResult,
    Cancelled,
    Lookup,
}

impl ErrorKind {
    /// Only local request failures are worth retrying as-is.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Request)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::CatalogUnauthorized => "catalog_unauthorized",
            ErrorKind::StreamingUnauthorized => "streaming_unauthorized",
            ErrorKind::UnexpectedStatus => "unexpected_status",
            ErrorKind::Request => "request",
            ErrorKind::Response => "response",
            ErrorKind::EmptyResult => "empty_result",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Lookup => "lookup",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ImportError {
    /// Convert a failure reported by the catalog port.
    pub fn from_catalog(error: BridgeError) -> Self {
        match error {
            BridgeError::Unauthorized(message) => ImportError::CatalogUnauthorized(message),
            other => Self::from_transport(other),
        }
    }

    /// Convert a failure reported by a streaming port.
    pub fn from_streaming(error: BridgeError) -> Self {
        match error {
            BridgeError::Unauthorized(message) => ImportError::StreamingUnauthorized(message),
            other => Self::from_transport(other),
        }
    }

    fn from_transport(error: BridgeError) -> Self {
        match error {
            BridgeError::UnexpectedStatus { status, body } => {
                ImportError::UnexpectedStatus { status, body }
            }
            BridgeError::Response(message) => ImportError::Response(message),
            BridgeError::Request(message)
            | BridgeError::NotAvailable(message)
            | BridgeError::OperationFailed(message)
            | BridgeError::Unauthorized(message) => ImportError::Request(message),
            BridgeError::Io(err) => ImportError::Request(err.to_string()),
        }
    }

    /// Fold per-item lookup failures into one batch failure.
    ///
    /// Any unauthorized failure wins, since the caller has to re-authenticate
    /// before a retry could succeed.
    pub fn from_lookup_failures(mut failures: Vec<LookupFailure>, total: usize) -> Self {
        if let Some(position) = failures.iter().position(|f| f.error.is_unauthorized()) {
            let failure = failures.swap_remove(position);
            return Self::from_streaming(failure.error);
        }

        failures.sort_by_key(|f| f.index);
        ImportError::Lookup {
            failed: failures.len(),
            total,
            failures,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::InvalidInput(_) => ErrorKind::InvalidInput,
            ImportError::CatalogUnauthorized(_) => ErrorKind::CatalogUnauthorized,
            ImportError::StreamingUnauthorized(_) => ErrorKind::StreamingUnauthorized,
            ImportError::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
            ImportError::Request(_) => ErrorKind::Request,
            ImportError::Response(_) => ErrorKind::Response,
            ImportError::EmptyResult => ErrorKind::EmptyResult,
            ImportError::Cancelled => ErrorKind::Cancelled,
            ImportError::Lookup { .. } => ErrorKind::Lookup,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
