//! # URL Resolver
//!
//! Classifies a free-form catalog URL into a [`ResolvedQuery`].
//!
//! Recognized shapes, tested in this order:
//!
//! | Shape | Kind | Identifier |
//! |-------|------|------------|
//! | any path containing `/wantlist`, with `?user=<name>` | Wantlist | `<name>` |
//! | `[/<locale>]/user/<name>/collection` | Collection | `<name>` |
//! | `[/<locale>]/lists/<slug>/<digits>` | List | `<digits>` |
//!
//! Wantlist goes first because it is identified by its query string, not by
//! its path shape. The locale is an optional two-letter leading segment
//! (`/es/`, `/de/`).

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::error::{ImportError, Result};

/// Which catalog resource a query addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Collection,
    Wantlist,
    List,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Collection => "collection",
            QueryKind::Wantlist => "wantlist",
            QueryKind::List => "list",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified catalog URL.
///
/// `identifier` is a username for collections and wantlists, and an opaque
/// numeric id for lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedQuery {
    pub kind: QueryKind,
    pub identifier: String,
}

impl ResolvedQuery {
    pub fn collection(user: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Collection,
            identifier: user.into(),
        }
    }

    pub fn wantlist(user: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Wantlist,
            identifier: user.into(),
        }
    }

    pub fn list(list_id: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::List,
            identifier: list_id.into(),
        }
    }

    /// Playlist name used when the caller does not supply one.
    pub fn default_playlist_name(&self) -> String {
        match self.kind {
            QueryKind::Collection => format!("{}'s collection", self.identifier),
            QueryKind::Wantlist => format!("{}'s wantlist", self.identifier),
            QueryKind::List => format!("List {}", self.identifier),
        }
    }
}

/// Classify `raw` into a [`ResolvedQuery`].
///
/// Scheme-less input is accepted (`www.discogs.com/user/x/collection`).
///
/// # Errors
///
/// [`ImportError::InvalidInput`] for empty input, unparsable URLs, a
/// wantlist URL without a `user` parameter, and every unrecognized shape.
pub fn resolve(raw: &str) -> Result<ResolvedQuery> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ImportError::InvalidInput("URL is empty".to_string()));
    }

    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| ImportError::InvalidInput(format!("Cannot parse URL {:?}: {}", raw, e)))?;

    if url.path().contains("/wantlist") {
        return resolve_wantlist(&url);
    }

    let segments = path_segments(&url)?;
    let segments = strip_locale(&segments);

    match segments.as_slice() {
        ["user", name, "collection"] if !name.is_empty() => Ok(ResolvedQuery::collection(*name)),
        ["lists", _slug, id] if is_numeric(id) => Ok(ResolvedQuery::list(*id)),
        _ => Err(ImportError::InvalidInput(format!(
            "Unrecognized catalog URL: {}",
            raw
        ))),
    }
}

fn resolve_wantlist(url: &Url) -> Result<ResolvedQuery> {
    url.query_pairs()
        .find(|(key, _)| key == "user")
        .map(|(_, value)| value.trim().to_string())
        .filter(|user| !user.is_empty())
        .map(ResolvedQuery::wantlist)
        .ok_or_else(|| {
            ImportError::InvalidInput("Wantlist URL is missing the 'user' parameter".to_string())
        })
}

/// Percent-decoded path segments, ignoring a single trailing slash.
fn path_segments(url: &Url) -> Result<Vec<String>> {
    let path = url.path().trim_start_matches('/');
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        return Ok(Vec::new());
    }

    path.split('/')
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .map_err(|e| ImportError::InvalidInput(format!("Bad path encoding: {}", e)))
        })
        .collect()
}

fn strip_locale(segments: &[String]) -> Vec<&str> {
    let mut view: Vec<&str> = segments.iter().map(String::as_str).collect();
    if view
        .first()
        .is_some_and(|first| first.len() == 2 && first.chars().all(|c| c.is_ascii_alphabetic()))
    {
        view.remove(0);
    }
    view
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}
