//! Boundary mapping
//!
//! Translates pipeline outcomes into what a CLI or HTTP front end shows:
//! a status code and a message derived from the error tag. Raw error text
//! stays in the logs.

use core_import::{ErrorKind, ImportError, PlaylistResult};
use serde::Serialize;

/// Route of the authentication collaborator that starts a new login.
pub const LOGIN_ROUTE: &str = "/login";

/// Successful import as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub id: String,
    pub url: String,
    pub source_entry_count: usize,
    pub matched_album_count: usize,
}

impl From<&PlaylistResult> for ImportResponse {
    fn from(result: &PlaylistResult) -> Self {
        Self {
            id: result.id.clone(),
            url: result.url.clone(),
            source_entry_count: result.source_entry_count,
            matched_album_count: result.matched_album_count,
        }
    }
}

/// Failed import as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoundaryResponse {
    /// Status-coded error body
    Error {
        status: u16,
        kind: ErrorKind,
        message: String,
    },
    /// The streaming credential must be renewed before retrying
    Reauthenticate { status: u16, location: String },
}

impl BoundaryResponse {
    pub fn from_error(error: &ImportError) -> Self {
        let kind = error.kind();
        let status = match kind {
            ErrorKind::InvalidInput => 400,
            ErrorKind::CatalogUnauthorized => 401,
            ErrorKind::StreamingUnauthorized => {
                return BoundaryResponse::Reauthenticate {
                    status: 302,
                    location: LOGIN_ROUTE.to_string(),
                }
            }
            _ => 500,
        };

        BoundaryResponse::Error {
            status,
            kind,
            message: user_message(kind).to_string(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            BoundaryResponse::Error { status, .. } | BoundaryResponse::Reauthenticate { status, .. } => {
                *status
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BoundaryResponse::Error { message, .. } => message,
            BoundaryResponse::Reauthenticate { .. } => user_message(ErrorKind::StreamingUnauthorized),
        }
    }
}

fn user_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidInput => {
            "Unrecognized URL. Paste a link to a user's collection, a wantlist or a list."
        }
        ErrorKind::CatalogUnauthorized => "That collection, wantlist or list is private.",
        ErrorKind::StreamingUnauthorized => "Please sign in to the streaming service again.",
        ErrorKind::EmptyResult => "Nothing to import: the catalog returned no entries.",
        ErrorKind::Cancelled => "The import was stopped before it finished.",
        ErrorKind::Lookup => "Some albums could not be looked up. Try again in a moment.",
        ErrorKind::UnexpectedStatus | ErrorKind::Request | ErrorKind::Response => {
            "A remote service failed while importing. Try again later."
        }
    }
}
