//! Discogs API connector implementation
//!
//! Implements the `CatalogSource` trait for the Discogs REST API.

use async_trait::async_trait;
use bridge_traits::catalog::{CatalogEntry, CatalogPage, CatalogSource};
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_runtime::config::{CatalogApiConfig, DEFAULT_CATALOG_BASE_URL};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::DiscogsError;
use crate::types::{CollectionResponse, ListResponse, Release, WantsResponse};

/// Items requested per page (Discogs maximum)
const PAGE_SIZE: u32 = 100;

/// Collection folder 0 is the "All" folder
const ALL_FOLDER: u32 = 0;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Discogs API connector
///
/// Implements `CatalogSource` for the Discogs REST API.
///
/// # Example
///
/// ```ignore
/// use provider_discogs::DiscogsConnector;
/// use bridge_traits::catalog::CatalogSource;
///
/// let connector = DiscogsConnector::new(http_client, Some(token), "Spinlist/0.1.0");
/// let page = connector.collection_page("someone", None).await?;
/// ```
pub struct DiscogsConnector {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    /// Personal access token; public resources work without one
    token: Option<String>,
    user_agent: String,
}

impl DiscogsConnector {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        token: Option<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            token: token.filter(|t| !t.is_empty()),
            user_agent: user_agent.into(),
        }
    }

    /// Build a connector from the catalog section of `CoreConfig`.
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &CatalogApiConfig) -> Self {
        Self::new(http_client, config.token.clone(), config.user_agent.clone())
            .with_base_url(config.base_url.clone())
    }

    /// Point the connector at another API root (trailing slashes are dropped).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, user: &str) -> String {
        format!(
            "{}/users/{}/collection/folders/{}/releases?per_page={}",
            self.base_url,
            urlencoding::encode(user),
            ALL_FOLDER,
            PAGE_SIZE
        )
    }

    fn wantlist_url(&self, user: &str) -> String {
        format!(
            "{}/users/{}/wants?per_page={}",
            self.base_url,
            urlencoding::encode(user),
            PAGE_SIZE
        )
    }

    fn list_url(&self, list_id: &str) -> String {
        format!("{}/lists/{}", self.base_url, urlencoding::encode(list_id))
    }

    /// Accept a cursor only if it points back into our API root, so the
    /// token is never sent to another host.
    fn page_url(&self, cursor: Option<String>, first_page: String) -> crate::Result<String> {
        match cursor.filter(|c| !c.is_empty()) {
            None => Ok(first_page),
            Some(cursor) if cursor.starts_with(&format!("{}/", self.base_url)) => Ok(cursor),
            Some(cursor) => Err(DiscogsError::ForeignCursor {
                base_url: self.base_url.clone(),
                cursor,
            }),
        }
    }

    fn request(&self, url: String) -> HttpRequest {
        let request = HttpRequest::get(url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/vnd.discogs.v2.discogs+json")
            .timeout(REQUEST_TIMEOUT);

        match &self.token {
            Some(token) => request.header("Authorization", format!("Discogs token={}", token)),
            None => request,
        }
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn get_json<T: DeserializeOwned>(&self, url: String) -> crate::Result<T> {
        let response = self.http_client.execute(self.request(url)).await?;
        Self::check_status(&response)?;

        response
            .json()
            .map_err(|e| DiscogsError::ParseError(e.to_string()))
    }

    fn check_status(response: &HttpResponse) -> crate::Result<()> {
        if response.is_success() {
            debug!("Discogs request succeeded: status={}", response.status);
            return Ok(());
        }

        // Private collections answer 403 to anonymous and foreign tokens.
        if response.status == 401 || response.status == 403 {
            warn!("Discogs rejected credentials: status={}", response.status);
            return Err(DiscogsError::Unauthorized {
                status: response.status,
            });
        }

        warn!("Discogs request failed: status={}", response.status);
        Err(DiscogsError::ApiError {
            status: response.status,
            body: response.text_lossy(),
        })
    }

    fn convert_release(release: Release) -> CatalogEntry {
        let info = release.basic_information;
        CatalogEntry::new(
            info.title,
            info.artists.into_iter().map(|a| a.name).collect(),
        )
    }
}

#[async_trait]
impl CatalogSource for DiscogsConnector {
    #[instrument(skip(self, cursor), fields(has_cursor = cursor.is_some()))]
    async fn collection_page(&self, user: &str, cursor: Option<String>) -> Result<CatalogPage> {
        let url = self.page_url(cursor, self.collection_url(user))?;
        let body: CollectionResponse = self.get_json(url).await?;

        debug!(
            "Collection page {}/{} for {}",
            body.pagination.page, body.pagination.pages, user
        );

        let entries = body
            .releases
            .into_iter()
            .map(Self::convert_release)
            .collect();

        Ok(CatalogPage::new(entries, body.pagination.urls.next))
    }

    #[instrument(skip(self, cursor), fields(has_cursor = cursor.is_some()))]
    async fn wantlist_page(&self, user: &str, cursor: Option<String>) -> Result<CatalogPage> {
        let url = self.page_url(cursor, self.wantlist_url(user))?;
        let body: WantsResponse = self.get_json(url).await?;

        debug!(
            "Wantlist page {}/{} for {}",
            body.pagination.page, body.pagination.pages, user
        );

        let entries = body.wants.into_iter().map(Self::convert_release).collect();

        Ok(CatalogPage::new(entries, body.pagination.urls.next))
    }

    #[instrument(skip(self))]
    async fn list_entries(&self, list_id: &str) -> Result<Vec<CatalogEntry>> {
        let body: ListResponse = self.get_json(self.list_url(list_id)).await?;

        info!(
            "Retrieved {} items from Discogs list {} ({})",
            body.items.len(),
            body.id,
            body.name
        );

        Ok(body
            .items
            .iter()
            .map(|item| CatalogEntry::from_display_title(&item.display_title))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use mockall::mock;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    const BASE: &str = "https://api.test";

    fn connector(mock_http: MockHttpClient, token: Option<&str>) -> DiscogsConnector {
        DiscogsConnector::new(
            Arc::new(mock_http),
            token.map(str::to_string),
            "SpinlistTest/1.0",
        )
        .with_base_url(BASE)
    }

    const COLLECTION_PAGE_1: &str = r#"{
        "pagination": {
            "page": 1, "pages": 2, "per_page": 100, "items": 101,
            "urls": {
                "next": "https://api.test/users/someone/collection/folders/0/releases?per_page=100&page=2",
                "last": "https://api.test/users/someone/collection/folders/0/releases?per_page=100&page=2"
            }
        },
        "releases": [
            {
                "id": 1,
                "instance_id": 99,
                "basic_information": {
                    "title": "Milo Goes To College",
                    "year": 1982,
                    "artists": [{"name": "Descendents", "id": 7}]
                }
            },
            {
                "id": 2,
                "basic_information": {
                    "title": "Split",
                    "artists": [{"name": "Artist A"}, {"name": "Artist B"}]
                }
            }
        ]
    }"#;

    const LAST_PAGE: &str = r#"{
        "pagination": {"page": 2, "pages": 2, "per_page": 100, "items": 101, "urls": {}},
        "wants": [
            {"id": 3, "basic_information": {"title": "Catholic Boy", "artists": [{"name": "Jim Carroll Band"}]}}
        ]
    }"#;

    #[tokio::test]
    async fn test_collection_page_first_request() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req: &HttpRequest| {
                req.url == "https://api.test/users/someone/collection/folders/0/releases?per_page=100"
                    && req.headers.get("Authorization") == Some(&"Discogs token=abc".to_string())
                    && req.headers.get("User-Agent") == Some(&"SpinlistTest/1.0".to_string())
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, COLLECTION_PAGE_1)));

        let page = connector(mock_http, Some("abc"))
            .collection_page("someone", None)
            .await
            .unwrap();

        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].title, "Milo Goes To College");
        assert_eq!(page.entries[0].artists, vec!["Descendents".to_string()]);
        assert_eq!(
            page.entries[1].artists,
            vec!["Artist A".to_string(), "Artist B".to_string()]
        );
        assert_eq!(
            page.next_cursor(),
            Some("https://api.test/users/someone/collection/folders/0/releases?per_page=100&page=2")
        );
    }

    #[tokio::test]
    async fn test_cursor_is_followed_verbatim() {
        let next = "https://api.test/users/someone/wants?per_page=100&page=2";
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(move |req: &HttpRequest| req.url == next)
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, LAST_PAGE)));

        let page = connector(mock_http, None)
            .wantlist_page("someone", Some(next.to_string()))
            .await
            .unwrap();

        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].title, "Catholic Boy");
        assert_eq!(page.next_cursor(), None);
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_authorization_header() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req: &HttpRequest| !req.headers.contains_key("Authorization"))
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, LAST_PAGE)));

        connector(mock_http, Some(""))
            .wantlist_page("someone", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_username_is_percent_encoded() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req: &HttpRequest| req.url == "https://api.test/users/dj%20shadow/wants?per_page=100")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, LAST_PAGE)));

        connector(mock_http, None)
            .wantlist_page("dj shadow", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_foreign_cursor_is_rejected() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(0);

        let err = connector(mock_http, Some("abc"))
            .collection_page("someone", Some("https://evil.test/steal".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Request(_)));
    }

    #[tokio::test]
    async fn test_private_collection_is_unauthorized() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(403, r#"{"message": "You don't have permission"}"#)));

        let err = connector(mock_http, None)
            .collection_page("someone", None)
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_unexpected_status_keeps_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(404, "The requested resource was not found.")));

        let err = connector(mock_http, None).list_entries("42").await.unwrap_err();

        match err {
            BridgeError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "The requested resource was not found.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_response_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "<html>")));

        let err = connector(mock_http, None)
            .wantlist_page("someone", None)
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Response(_)));
    }

    #[tokio::test]
    async fn test_list_items_split_display_titles() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req: &HttpRequest| req.url == "https://api.test/lists/123")
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{
                        "id": 123,
                        "name": "Best of 1980",
                        "items": [
                            {"id": 1, "type": "release", "display_title": "Jim Carroll Band - Catholic Boy"},
                            {"id": 2, "type": "master", "display_title": "Untitled"}
                        ]
                    }"#,
                ))
            });

        let entries = connector(mock_http, None).list_entries("123").await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Catholic Boy");
        assert_eq!(entries[0].artists, vec!["Jim Carroll Band".to_string()]);
        assert_eq!(entries[1].title, "Untitled");
        assert!(entries[1].artists.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Request("connection reset".to_string())));

        let err = connector(mock_http, None)
            .collection_page("someone", None)
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Request(_)));
    }

    #[test]
    fn test_from_config_uses_base_url_and_token() {
        let config = CatalogApiConfig {
            base_url: "https://mirror.test/".to_string(),
            token: Some("tok".to_string()),
            user_agent: "Spinlist/0.1.0".to_string(),
        };

        let connector = DiscogsConnector::from_config(Arc::new(MockHttpClient::new()), &config);

        assert_eq!(connector.base_url(), "https://mirror.test");
        assert_eq!(
            connector.collection_url("a"),
            "https://mirror.test/users/a/collection/folders/0/releases?per_page=100"
        );
    }
}
