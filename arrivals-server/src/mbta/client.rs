//! MBTA v3 HTTP client.
//!
//! Stop and route are fixed at construction; nothing about the outgoing
//! request is derived from user input.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use super::error::FetchError;
use super::types::{PredictionsDocument, StopResource, StopsDocument};

/// Default base URL for the MBTA v3 API.
const DEFAULT_BASE_URL: &str = "https://api-v3.mbta.com";

/// Related resources requested alongside predictions.
const PREDICTION_INCLUDES: &str = "trip,schedule,vehicle";

/// Maximum number of body characters kept in an error message.
const ERROR_BODY_LIMIT: usize = 500;

/// Configuration for the MBTA client.
#[derive(Debug, Clone)]
pub struct MbtaConfig {
    /// Optional API key, sent as `x-api-key`. Unauthenticated requests
    /// work but are rate limited more aggressively.
    pub api_key: Option<String>,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Stop whose predictions are fetched
    pub stop_id: String,
    /// Route used to filter predictions and list stops
    pub route_id: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MbtaConfig {
    /// Create a config for the given stop and route.
    pub fn new(stop_id: impl Into<String>, route_id: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            stop_id: stop_id.into(),
            route_id: route_id.into(),
            timeout_secs: 30,
        }
    }

    /// Set the API key. Empty keys are ignored.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Anything that can produce a predictions document.
///
/// The refresh loop depends on this rather than on [`MbtaClient`] so it can
/// be driven by canned data in tests.
pub trait PredictionSource: Send + Sync {
    /// Fetch the current predictions for the configured stop.
    fn fetch_predictions(
        &self,
    ) -> impl Future<Output = Result<PredictionsDocument, FetchError>> + Send;
}

/// MBTA v3 API client.
#[derive(Debug, Clone)]
pub struct MbtaClient {
    http: reqwest::Client,
    base_url: String,
    stop_id: String,
    route_id: String,
}

impl MbtaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MbtaConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| FetchError::InvalidApiKey)?;
            headers.insert(HeaderName::from_static("x-api-key"), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            stop_id: config.stop_id,
            route_id: config.route_id,
        })
    }

    /// The route this client filters on.
    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    /// Query parameters for the predictions request.
    fn prediction_query(&self) -> [(&'static str, &str); 4] {
        [
            ("filter[stop]", self.stop_id.as_str()),
            ("filter[route]", self.route_id.as_str()),
            ("include", PREDICTION_INCLUDES),
            ("sort", "arrival_time"),
        ]
    }

    /// Get predictions for the configured stop, sorted by arrival time,
    /// with trips, schedules and vehicles included.
    pub async fn fetch_predictions(&self) -> Result<PredictionsDocument, FetchError> {
        self.get_json("predictions", &self.prediction_query()).await
    }

    /// Get every stop on the configured route, sorted by name.
    pub async fn fetch_route_stops(&self) -> Result<Vec<StopResource>, FetchError> {
        let doc: StopsDocument = self
            .get_json(
                "stops",
                &[("filter[route]", self.route_id.as_str()), ("sort", "name")],
            )
            .await?;
        Ok(doc.data)
    }

    /// Issue a GET against `{base_url}/{resource}` and decode the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, resource);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            message: e.to_string(),
        })
    }
}

impl PredictionSource for MbtaClient {
    async fn fetch_predictions(&self) -> Result<PredictionsDocument, FetchError> {
        MbtaClient::fetch_predictions(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use serde_json::json;

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Router answering every request with a fixed status and body.
    fn respond_with(status: StatusCode, body: impl Into<String>) -> Router {
        let body = body.into();
        Router::new().fallback(move || async move { (status, body) })
    }

    fn client_for(base_url: &str, api_key: Option<&str>) -> MbtaClient {
        let config = MbtaConfig::new("place-portr", "Red")
            .with_base_url(base_url)
            .with_api_key(api_key.map(str::to_string))
            .with_timeout(5);
        MbtaClient::new(config).unwrap()
    }

    /// A request as seen by the local server.
    #[derive(Debug, Clone)]
    struct SeenRequest {
        path: String,
        query: String,
        api_key: Option<String>,
    }

    /// Router that records each request and answers with `body` as JSON.
    fn recording(body: serde_json::Value) -> (Router, Arc<Mutex<Vec<SeenRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let router = Router::new().fallback(move |uri: Uri, headers: HeaderMap| {
            let log = Arc::clone(&log);
            let body = body.clone();
            async move {
                log.lock().unwrap().push(SeenRequest {
                    path: uri.path().to_string(),
                    query: uri.query().unwrap_or_default().to_string(),
                    api_key: headers
                        .get("x-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                });
                axum::Json(body)
            }
        });
        (router, seen)
    }

    #[test]
    fn config_builder() {
        let config = MbtaConfig::new("place-portr", "Red")
            .with_api_key(Some("test-key".to_string()))
            .with_base_url("http://localhost:8080/")
            .with_timeout(5);

        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = MbtaConfig::new("place-portr", "Red");

        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.stop_id, "place-portr");
        assert_eq!(config.route_id, "Red");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let config = MbtaConfig::new("place-portr", "Red").with_api_key(Some("  ".to_string()));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn client_creation() {
        let config = MbtaConfig::new("place-portr", "Red").with_api_key(Some("abc123".into()));
        let client = MbtaClient::new(config).unwrap();
        assert_eq!(client.route_id(), "Red");
    }

    #[test]
    fn invalid_api_key_is_rejected() {
        let config =
            MbtaConfig::new("place-portr", "Red").with_api_key(Some("bad\nkey".to_string()));
        assert!(matches!(
            MbtaClient::new(config),
            Err(FetchError::InvalidApiKey)
        ));
    }

    #[test]
    fn prediction_query_uses_fixed_stop_and_route() {
        let client = MbtaClient::new(MbtaConfig::new("place-portr", "Red")).unwrap();
        let query = client.prediction_query();

        assert!(query.contains(&("filter[stop]", "place-portr")));
        assert!(query.contains(&("filter[route]", "Red")));
        assert!(query.contains(&("include", "trip,schedule,vehicle")));
        assert!(query.contains(&("sort", "arrival_time")));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let config = MbtaConfig::new("place-portr", "Red")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(2);
        let client = MbtaClient::new(config).unwrap();

        let err = client.fetch_predictions().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "{err}");
    }

    #[tokio::test]
    async fn unauthorized_statuses_map_to_unauthorized() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let base = serve(respond_with(status, "nope")).await;
            let err = client_for(&base, Some("k")).fetch_predictions().await.unwrap_err();
            assert!(matches!(err, FetchError::Unauthorized), "{status}: {err}");
        }
    }

    #[tokio::test]
    async fn too_many_requests_maps_to_rate_limited() {
        let base = serve(respond_with(StatusCode::TOO_MANY_REQUESTS, "slow down")).await;
        let err = client_for(&base, None).fetch_predictions().await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited), "{err}");
    }

    #[tokio::test]
    async fn other_failures_map_to_upstream() {
        let base = serve(respond_with(StatusCode::SERVICE_UNAVAILABLE, "down")).await;
        let err = client_for(&base, None).fetch_predictions().await.unwrap_err();

        match err {
            FetchError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "down");
            }
            other => panic!("expected upstream error, got {other}"),
        }
    }

    #[tokio::test]
    async fn upstream_body_is_truncated() {
        let base = serve(respond_with(StatusCode::BAD_GATEWAY, "x".repeat(2000))).await;
        let err = client_for(&base, None).fetch_route_stops().await.unwrap_err();

        match err {
            FetchError::Upstream { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), ERROR_BODY_LIMIT);
            }
            other => panic!("expected upstream error, got {other}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_maps_to_decode() {
        let base = serve(respond_with(StatusCode::OK, "<html>maintenance</html>")).await;
        let err = client_for(&base, None).fetch_predictions().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }), "{err}");
    }

    #[tokio::test]
    async fn api_key_header_sent_when_configured() {
        let (router, seen) = recording(json!({ "data": [], "included": [] }));
        let base = serve(router).await;

        client_for(&base, Some("secret")).fetch_predictions().await.unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/predictions");
        assert_eq!(seen[0].api_key.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn api_key_header_omitted_when_unset() {
        let (router, seen) = recording(json!({ "data": [] }));
        let base = serve(router).await;

        client_for(&base, None).fetch_route_stops().await.unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/stops");
        assert!(seen[0].api_key.is_none());
    }

    #[tokio::test]
    async fn predictions_request_carries_fixed_filters() {
        let (router, seen) = recording(json!({ "data": [] }));
        let base = serve(router).await;

        client_for(&base, None).fetch_predictions().await.unwrap();

        let query = seen.lock().unwrap()[0].query.clone();
        for expected in [
            "filter%5Bstop%5D=place-portr",
            "filter%5Broute%5D=Red",
            "include=trip%2Cschedule%2Cvehicle",
            "sort=arrival_time",
        ] {
            assert!(query.contains(expected), "{query} missing {expected}");
        }
    }

    #[tokio::test]
    async fn malformed_prediction_does_not_fail_the_fetch() {
        let (router, _) = recording(json!({
            "data": [
                {
                    "id": "ok",
                    "attributes": { "arrival_time": "2024-03-15T12:05:00Z" },
                    "relationships": { "trip": { "data": { "type": "trip", "id": "t1" } } }
                },
                { "attributes": { "arrival_time": 12345 } }
            ],
            "included": [{ "type": "trip", "id": "t1", "attributes": { "headsign": "Alewife" } }]
        }));
        let base = serve(router).await;

        let doc = client_for(&base, None).fetch_predictions().await.unwrap();

        assert_eq!(doc.data.len(), 2);
        assert_eq!(doc.included.len(), 1);
    }
}
