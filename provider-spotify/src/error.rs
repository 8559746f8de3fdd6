//! Error types for the Spotify provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Access token expired, revoked, or missing a scope
    #[error("Spotify rejected the access token (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Spotify API error (status {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Failed to parse Spotify response: {0}")]
    ParseError(String),

    /// A batch exceeded the per-request limit of the endpoint
    #[error("Batch of {got} exceeds the Spotify limit of {limit}")]
    BatchTooLarge { limit: usize, got: usize },

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, SpotifyError>;

impl From<SpotifyError> for BridgeError {
    fn from(error: SpotifyError) -> Self {
        match error {
            e @ SpotifyError::Unauthorized { .. } => BridgeError::Unauthorized(e.to_string()),
            SpotifyError::ApiError { status, body } => BridgeError::UnexpectedStatus { status, body },
            SpotifyError::ParseError(msg) => BridgeError::Response(msg),
            e @ SpotifyError::BatchTooLarge { .. } => BridgeError::Request(e.to_string()),
            SpotifyError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_conversion() {
        let error = SpotifyError::Unauthorized {
            status: 401,
            message: "The access token expired".to_string(),
        };
        let bridge_error: BridgeError = error.into();

        assert!(bridge_error.is_unauthorized());
        assert!(bridge_error.to_string().contains("The access token expired"));
    }

    #[test]
    fn test_batch_too_large_is_request_error() {
        let bridge_error: BridgeError = SpotifyError::BatchTooLarge { limit: 20, got: 21 }.into();
        assert!(matches!(bridge_error, BridgeError::Request(_)));
    }
}
