//! Error types for the Discogs provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Discogs provider errors
#[derive(Error, Debug)]
pub enum DiscogsError {
    /// Token missing, revoked, or the resource is private
    #[error("Discogs rejected the credentials (status {status})")]
    Unauthorized { status: u16 },

    /// API request returned a non-success status
    #[error("Discogs API error (status {status}): {body}")]
    ApiError { status: u16, body: String },

    /// Failed to parse API response
    #[error("Failed to parse Discogs response: {0}")]
    ParseError(String),

    /// A pagination cursor pointed outside the configured API
    #[error("Refusing to follow pagination cursor outside {base_url}: {cursor}")]
    ForeignCursor { base_url: String, cursor: String },

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Discogs operations
pub type Result<T> = std::result::Result<T, DiscogsError>;

impl From<DiscogsError> for BridgeError {
    fn from(error: DiscogsError) -> Self {
        match error {
            DiscogsError::Unauthorized { status } => {
                BridgeError::Unauthorized(format!("Discogs returned status {}", status))
            }
            DiscogsError::ApiError { status, body } => BridgeError::UnexpectedStatus { status, body },
            DiscogsError::ParseError(msg) => BridgeError::Response(msg),
            e @ DiscogsError::ForeignCursor { .. } => BridgeError::Request(e.to_string()),
            DiscogsError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DiscogsError::ApiError {
            status: 404,
            body: "Resource not found".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Discogs API error (status 404): Resource not found"
        );
    }

    #[test]
    fn test_unauthorized_stays_unauthorized() {
        let bridge_error: BridgeError = DiscogsError::Unauthorized { status: 401 }.into();
        assert!(bridge_error.is_unauthorized());
    }

    #[test]
    fn test_status_and_body_carried_through() {
        let bridge_error: BridgeError = DiscogsError::ApiError {
            status: 503,
            body: "maintenance".to_string(),
        }
        .into();

        match bridge_error {
            BridgeError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected conversion: {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_becomes_response_error() {
        let bridge_error: BridgeError = DiscogsError::ParseError("missing field".into()).into();
        assert!(matches!(bridge_error, BridgeError::Response(_)));
    }
}
