//! # Spotify Provider
//!
//! Implements the `AlbumSearch` and `PlaylistWriter` ports over the
//! Spotify Web API using a user-scoped OAuth access token.
//!
//! Obtaining and refreshing the token is the caller's concern; a 401 or 403
//! from the API surfaces as `BridgeError::Unauthorized` so the caller can
//! send the user back through login.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::SpotifyConnector;
pub use error::{Result, SpotifyError};
