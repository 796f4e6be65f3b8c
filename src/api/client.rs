//! Microsoft Graph HTTP client

use crate::auth::TokenProvider;
use crate::error::TransportError;
use crate::models::{ODataError, ODataResponse};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_MAX_RETRIES: u32 = 5;
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// HTTP client for the Graph API
pub struct GraphClient {
    http_client: Client,
    tokens: Arc<dyn TokenProvider>,
    base_url: String,
    max_retries: u32,
}

impl GraphClient {
    /// Create a new Graph client
    ///
    /// # Arguments
    /// * `graph_url` - Graph root, e.g. "https://graph.microsoft.com"
    /// * `api_version` - "beta" or "v1.0"
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        graph_url: &str,
        api_version: &str,
    ) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .user_agent(concat!("assignmap/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            tokens,
            base_url: format!(
                "{}/{}",
                graph_url.trim_end_matches('/'),
                api_version.trim_matches('/')
            ),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Get the versioned API root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http") {
            endpoint.to_string()
        } else {
            format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
        }
    }

    /// Make an authenticated GET request, retrying throttling and gateway errors
    async fn get(&self, endpoint: &str) -> Result<Response, TransportError> {
        let url = self.url(endpoint);
        let mut attempt = 0;
        let mut delay = Duration::from_secs(1);

        loop {
            let token = self.tokens.token().await?;
            let response = self
                .http_client
                .get(&url)
                .bearer_auth(&token)
                .header("Accept", "application/json")
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let retryable = status == StatusCode::TOO_MANY_REQUESTS
                || matches!(
                    status,
                    StatusCode::BAD_GATEWAY
                        | StatusCode::SERVICE_UNAVAILABLE
                        | StatusCode::GATEWAY_TIMEOUT
                );

            if retryable && attempt < self.max_retries {
                attempt += 1;
                let wait = retry_after(&response).unwrap_or(delay);
                warn!(
                    "Graph returned {}, retry {}/{} after {:?}",
                    status, attempt, self.max_retries, wait
                );
                tokio::time::sleep(wait).await;
                delay = delay.saturating_mul(2).min(MAX_RETRY_AFTER);
                continue;
            }

            return Err(api_error(response).await);
        }
    }

    /// Make an authenticated GET request and deserialize the JSON body
    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, TransportError> {
        let body = self.get(endpoint).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch every page of a collection, following `@odata.nextLink`
    #[instrument(skip(self))]
    pub async fn get_all<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, TransportError> {
        let mut items = Vec::new();
        let mut next = Some(endpoint.to_string());

        while let Some(url) = next {
            debug!("Fetching page: {}", url);
            let page: ODataResponse<T> = self.get_json(&url).await?;
            items.extend(page.value);
            next = page.next_link;
        }

        Ok(items)
    }
}

/// `Retry-After` in seconds, capped
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

async fn api_error(response: Response) -> TransportError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ODataError>(&body) {
        Ok(odata) => TransportError::Api {
            status: status.as_u16(),
            code: odata.error.code,
            message: odata.error.message,
        },
        Err(_) => TransportError::Api {
            status: status.as_u16(),
            code: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> GraphClient {
        GraphClient::new(Arc::new(StaticToken::new("test-token")), &server.uri(), "beta")
            .unwrap()
            .with_max_retries(2)
    }

    #[test]
    fn test_url_building() {
        let client = GraphClient::new(
            Arc::new(StaticToken::new("t")),
            "https://graph.microsoft.com/",
            "beta",
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://graph.microsoft.com/beta");
        assert_eq!(
            client.url("/deviceManagement/intents"),
            "https://graph.microsoft.com/beta/deviceManagement/intents"
        );
        assert_eq!(client.url("https://elsewhere/x"), "https://elsewhere/x");
    }

    #[tokio::test]
    async fn test_get_all_follows_next_link() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/beta/deviceManagement/intents"))
            .and(query_param("$skiptoken", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "3"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/beta/deviceManagement/intents"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "1"}, {"id": "2"}],
                "@odata.nextLink": format!("{}/beta/deviceManagement/intents?$skiptoken=page2", server.uri())
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let items: Vec<serde_json::Value> = client.get_all("deviceManagement/intents").await.unwrap();

        let ids: Vec<_> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_odata_error_is_mapped() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/beta/deviceManagement/intents"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": "Forbidden", "message": "Insufficient privileges"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get_all::<serde_json::Value>("deviceManagement/intents")
            .await
            .unwrap_err();

        match err {
            TransportError::Api { status, code, message } => {
                assert_eq!(status, 403);
                assert_eq!(code, "Forbidden");
                assert_eq!(message, "Insufficient privileges");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_throttling_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/beta/groups"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/beta/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let items: Vec<serde_json::Value> = client.get_all("groups").await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_until_retries_run_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/beta/groups"))
            .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "0"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get_json::<serde_json::Value>("groups").await.unwrap_err();

        assert!(matches!(err, TransportError::Api { status: 503, .. }));
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn test_many_retries_keep_backoff_bounded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/beta/groups"))
            .respond_with(ResponseTemplate::new(502).insert_header("Retry-After", "0"))
            .mount(&server)
            .await;

        let client = test_client(&server).with_max_retries(80);
        let err = client.get_json::<serde_json::Value>("groups").await.unwrap_err();

        assert!(matches!(err, TransportError::Api { status: 502, .. }));
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 81);
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/beta/groups"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get_json::<serde_json::Value>("groups").await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Api { status: 404, ref message, .. } if message == "not here"
        ));
    }
}
