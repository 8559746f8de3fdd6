//! # Catalog Paginator
//!
//! Walks the cursor-linked pages of a catalog resource and accumulates every
//! entry in page order, then in the remote's order within each page. Pages
//! are fetched one after another because each page names the next.

use bridge_traits::{CatalogEntry, CatalogPage, CatalogSource};
use core_async::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::{ImportError, Result};
use crate::query::{QueryKind, ResolvedQuery};

/// Fetch every catalog entry addressed by `query`.
///
/// Lists are a single response. Collections and wantlists are followed
/// until the envelope's next-page URL is absent or empty. Cancellation is
/// observed between pages.
///
/// # Errors
///
/// The first port failure, converted with [`ImportError::from_catalog`]
/// (so `401` becomes [`ImportError::CatalogUnauthorized`]), or
/// [`ImportError::Cancelled`].
#[instrument(skip(source, cancel), fields(kind = %query.kind, id = %query.identifier))]
pub async fn fetch_all(
    source: &dyn CatalogSource,
    query: &ResolvedQuery,
    cancel: &CancellationToken,
) -> Result<Vec<CatalogEntry>> {
    if cancel.is_cancelled() {
        return Err(ImportError::Cancelled);
    }

    let user = query.identifier.as_str();
    let mut entries = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page: CatalogPage = match query.kind {
            QueryKind::List => {
                let entries = source
                    .list_entries(user)
                    .await
                    .map_err(ImportError::from_catalog)?;
                debug!(entries = entries.len(), "Fetched list");
                return Ok(entries);
            }
            QueryKind::Collection => source.collection_page(user, cursor.take()).await,
            QueryKind::Wantlist => source.wantlist_page(user, cursor.take()).await,
        }
        .map_err(ImportError::from_catalog)?;

        pages += 1;
        debug!(page = pages, entries = page.entries.len(), "Fetched catalog page");

        cursor = page.next_cursor().map(str::to_string);
        entries.extend(page.entries);

        if cursor.is_none() {
            break;
        }
        if cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }
    }

    debug!(pages, entries = entries.len(), "Catalog exhausted");
    Ok(entries)
}
