//! Import service wired through the real connectors over a scripted transport.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_async::sync::CancellationToken;
use core_async::time::Duration;
use core_runtime::config::{CoreConfig, CoreConfigBuilder, ImportSettings};
use core_runtime::events::ImportEvent;
use core_service::{
    BoundaryResponse, CoreError, ImportError, ImportPorts, ImportRequest, ImportResponse,
    ImportService,
};
use std::sync::{Arc, Mutex};

const CATALOG: &str = "http://catalog.test";
const STREAMING: &str = "http://streaming.test/v1";
const FIRST_PAGE: &str = "http://catalog.test/users/digger/collection/folders/0/releases?per_page=100";
const SECOND_PAGE: &str =
    "http://catalog.test/users/digger/collection/folders/0/releases?per_page=100&page=2";

#[derive(Default)]
struct ScriptedHttp {
    requests: Mutex<Vec<HttpRequest>>,
    catalog_status: Option<u16>,
    search_status: Option<u16>,
    catalog_delay: Option<Duration>,
}

impl ScriptedHttp {
    fn requests_to(&self, method: HttpMethod, prefix: &str) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn catalog_page(url: &str) -> HttpResponse {
        let body = if url == FIRST_PAGE {
            format!(
                r#"{{
                    "pagination": {{"page": 1, "pages": 2, "urls": {{"next": "{}"}}}},
                    "releases": [
                        {{"id": 1, "basic_information": {{"title": "Milo Goes to College", "artists": [{{"name": "Descendents"}}]}}}},
                        {{"id": 2, "basic_information": {{"title": " Catholic Boy ", "artists": [{{"name": "The Jim Carroll Band"}}]}}}}
                    ]
                }}"#,
                SECOND_PAGE
            )
        } else {
            r#"{
                "pagination": {"page": 2, "pages": 2, "urls": {}},
                "releases": [
                    {"id": 1, "basic_information": {"title": "Milo Goes to College", "artists": [{"name": "Descendents"}]}},
                    {"id": 3, "basic_information": {"title": "Unreleased Demo", "artists": [{"name": "Nobody"}]}}
                ]
            }"#
            .to_string()
        };
        HttpResponse::new(200, body)
    }

    fn search(url: &str) -> HttpResponse {
        let id = if url.contains("Descendents") {
            Some("alb-milo")
        } else if url.contains("Jim%20Carroll") {
            Some("alb-catholic")
        } else {
            None
        };
        let items = id.map_or(String::new(), |id| format!(r#"{{"id": "{}"}}"#, id));
        HttpResponse::new(200, format!(r#"{{"albums": {{"items": [{}]}}}}"#, items))
    }

    fn albums(url: &str) -> HttpResponse {
        let ids = url.split("ids=").nth(1).unwrap_or_default();
        let albums: Vec<String> = ids
            .split(',')
            .map(|id| {
                format!(
                    r#"{{"id": "{id}", "tracks": {{"items": [{{"uri": "spotify:track:{id}-1"}}, {{"uri": "spotify:track:{id}-2"}}]}}}}"#,
                    id = id
                )
            })
            .collect();
        HttpResponse::new(200, format!(r#"{{"albums": [{}]}}"#, albums.join(",")))
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let url = request.url.as_str();

        if url.starts_with(CATALOG) {
            if let Some(delay) = self.catalog_delay {
                core_async::sleep(delay).await;
            }
            if let Some(status) = self.catalog_status {
                return Ok(HttpResponse::new(status, r#"{"message": "private"}"#));
            }
            return Ok(Self::catalog_page(url));
        }

        let path = url.trim_start_matches(STREAMING);
        let response = match (request.method, path) {
            (HttpMethod::Get, p) if p.starts_with("/search") => match self.search_status {
                Some(status) => HttpResponse::new(
                    status,
                    r#"{"error": {"status": 401, "message": "The access token expired"}}"#,
                ),
                None => Self::search(url),
            },
            (HttpMethod::Get, p) if p.starts_with("/albums") => Self::albums(url),
            (HttpMethod::Post, "/me/playlists") => HttpResponse::new(
                201,
                r#"{"id": "pl-1", "external_urls": {"spotify": "https://open.spotify.com/playlist/pl-1"}}"#,
            ),
            (HttpMethod::Post, "/playlists/pl-1/tracks") => {
                HttpResponse::new(201, r#"{"snapshot_id": "s1"}"#)
            }
            _ => HttpResponse::new(404, "no route"),
        };
        Ok(response)
    }
}

fn config(http: Arc<ScriptedHttp>) -> CoreConfig {
    CoreConfigBuilder::default()
        .catalog_base_url(CATALOG)
        .catalog_token("discogs-secret")
        .streaming_base_url(STREAMING)
        .streaming_access_token("spotify-secret")
        .lookup_interval_ms(1)
        .http_client(http)
        .build()
        .unwrap()
}

#[core_async::test]
async fn test_collection_import_end_to_end() {
    let http = Arc::new(ScriptedHttp::default());
    let service = ImportService::from_config(&config(http.clone())).unwrap();
    let mut events = service.subscribe();

    let result = service
        .import(&ImportRequest::new("https://www.discogs.com/user/digger/collection"))
        .await
        .unwrap();

    assert_eq!(
        ImportResponse::from(&result),
        ImportResponse {
            id: "pl-1".into(),
            url: "https://open.spotify.com/playlist/pl-1".into(),
            source_entry_count: 4,
            matched_album_count: 2,
        }
    );
    assert_eq!(result.track_count, 4);

    let catalog_requests = http.requests_to(HttpMethod::Get, CATALOG);
    assert_eq!(catalog_requests.len(), 2);
    assert_eq!(catalog_requests[1].url, SECOND_PAGE);
    assert_eq!(
        catalog_requests[0].headers.get("Authorization"),
        Some(&"Discogs token=discogs-secret".to_string())
    );

    // Every physical entry is looked up, duplicates included.
    let searches = http.requests_to(HttpMethod::Get, &format!("{}/search", STREAMING));
    assert_eq!(searches.len(), 4);
    assert!(searches
        .iter()
        .all(|r| r.headers.get("Authorization") == Some(&"Bearer spotify-secret".to_string())));

    let lookups = http.requests_to(HttpMethod::Get, &format!("{}/albums", STREAMING));
    assert_eq!(lookups.len(), 1);
    assert!(lookups[0].url.ends_with("ids=alb-milo,alb-catholic"));

    let created = http.requests_to(HttpMethod::Post, &format!("{}/me/playlists", STREAMING));
    assert_eq!(created.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(created[0].body.as_ref().unwrap()).unwrap();
    assert_eq!(body["name"], "digger's collection");
    assert_eq!(body["public"], false);

    let writes = http.requests_to(HttpMethod::Post, &format!("{}/playlists/", STREAMING));
    assert_eq!(writes.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(writes[0].body.as_ref().unwrap()).unwrap();
    assert_eq!(body["uris"].as_array().unwrap().len(), 4);

    let mut last = None;
    while let Some(Ok(event)) = events.try_recv() {
        last = Some(event);
    }
    assert!(matches!(last, Some(ImportEvent::Completed { matched_albums: 2, .. })));
}

#[core_async::test]
async fn test_private_catalog_maps_to_401_without_searching() {
    let http = Arc::new(ScriptedHttp {
        catalog_status: Some(403),
        ..ScriptedHttp::default()
    });
    let service = ImportService::from_config(&config(http.clone())).unwrap();

    let err = service
        .import(&ImportRequest::new("https://www.discogs.com/user/digger/collection"))
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::CatalogUnauthorized(_)));
    assert_eq!(BoundaryResponse::from_error(&err).status(), 401);
    assert!(http.requests_to(HttpMethod::Get, STREAMING).is_empty());
}

#[core_async::test]
async fn test_expired_streaming_token_redirects_to_login() {
    let http = Arc::new(ScriptedHttp {
        search_status: Some(401),
        ..ScriptedHttp::default()
    });
    let service = ImportService::from_config(&config(http.clone())).unwrap();

    let err = service
        .import(&ImportRequest::new("https://www.discogs.com/user/digger/collection"))
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::StreamingUnauthorized(_)));
    assert!(matches!(
        BoundaryResponse::from_error(&err),
        BoundaryResponse::Reauthenticate { status: 302, .. }
    ));
    assert!(http
        .requests_to(HttpMethod::Post, &format!("{}/me/playlists", STREAMING))
        .is_empty());
}

#[core_async::test]
async fn test_invalid_url_is_bad_request() {
    let http = Arc::new(ScriptedHttp::default());
    let service = ImportService::from_config(&config(http.clone())).unwrap();

    let err = service
        .import(&ImportRequest::new("https://www.discogs.com/artist/123"))
        .await
        .unwrap_err();

    assert_eq!(BoundaryResponse::from_error(&err).status(), 400);
    assert!(http.requests.lock().unwrap().is_empty());
}

#[core_async::test]
async fn test_deadline_cancels_the_run() {
    let http = Arc::new(ScriptedHttp {
        catalog_delay: Some(Duration::from_millis(50)),
        ..ScriptedHttp::default()
    });
    let settings = ImportSettings {
        lookup_interval_ms: 1,
        import_timeout_secs: 0,
        playlist_public: false,
    };
    let ports = ImportPorts::from_config(&config(http.clone())).unwrap();
    let service = ImportService::new(ports, &settings);

    let err = service
        .import(&ImportRequest::new("https://www.discogs.com/user/digger/collection"))
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Cancelled));
    assert!(http.requests_to(HttpMethod::Post, STREAMING).is_empty());
}

#[core_async::test]
async fn test_caller_cancellation_is_honoured() {
    let http = Arc::new(ScriptedHttp::default());
    let service = ImportService::from_config(&config(http.clone())).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = service
        .import_with_cancel(
            &ImportRequest::new("https://www.discogs.com/user/digger/collection"),
            &cancel,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Cancelled));
    assert_eq!(BoundaryResponse::from_error(&err).status(), 500);
}

#[test]
fn test_ports_require_an_http_client() {
    let mut config = config(Arc::new(ScriptedHttp::default()));
    config.http_client = None;

    let result = ImportPorts::from_config(&config);

    assert!(matches!(result, Err(CoreError::CapabilityMissing { .. })));
}
