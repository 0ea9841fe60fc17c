use crate::constants::MAPPING_PATH;
use crate::error::Error;
use crate::services::merger::WindowSet;
use crate::models::{MappingEntry, Window, WindowResponse, WindowSnapshot};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Client for the upstream price service.
///
/// Sends the configured identifying User-Agent on every request.
#[derive(Clone)]
pub struct WikiClient {
    base_url: String,
    client: reqwest::Client,
}

impl WikiClient {
    /// Create a new upstream client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the price API (e.g. "https://prices.runescape.wiki/api/v1/osrs")
    /// * `user_agent` - Identifying User-Agent header value
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, Error> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid upstream url: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| Error::Config(format!("Invalid user agent '{}': {}", user_agent, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %base_url, "Created upstream client");

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /mapping - every tradeable item with its metadata
    pub async fn fetch_mapping(&self) -> Result<Vec<MappingEntry>, Error> {
        let entries: Vec<MappingEntry> = self.get_json(MAPPING_PATH).await?;
        info!(items = entries.len(), "Fetched mapping");
        Ok(entries)
    }

    /// GET /{latest,5m,1h,24h} - the `data` object of one window document
    pub async fn fetch_window(&self, window: Window) -> Result<WindowSnapshot, Error> {
        let body: serde_json::Value = self.get_json(window.to_path()).await?;

        if !body.get("data").is_some_and(|data| data.is_object()) {
            return Err(Error::InvalidResponse(format!(
                "{} document has no 'data' object",
                window
            )));
        }

        let response: WindowResponse = serde_json::from_value(body)
            .map_err(|e| Error::Parse(format!("Failed to parse {} window: {}", window, e)))?;

        debug!(window = %window, items = response.data.len(), "Fetched window");
        Ok(response.data)
    }

    /// Fetch all four windows concurrently.
    ///
    /// Any failed window fails the whole set, so a refresh never installs a
    /// snapshot merged from partial upstream data.
    pub async fn fetch_all_windows(&self) -> Result<WindowSet, Error> {
        let (latest, five_minute, one_hour, twenty_four_hour) = tokio::join!(
            self.fetch_window(Window::Latest),
            self.fetch_window(Window::FiveMinute),
            self.fetch_window(Window::OneHour),
            self.fetch_window(Window::TwentyFourHour),
        );

        Ok(WindowSet {
            latest: latest?,
            five_minute: five_minute?,
            one_hour: one_hour?,
            twenty_four_hour: twenty_four_hour?,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "Sending upstream request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(Error::Network(format!(
                "{} returned error status {}: {}",
                url, status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body from {}: {}", url, e)))?;

        serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("Failed to parse JSON from {}: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WikiClient {
        WikiClient::new(&server.uri(), "PriceProxy-Test/1.0", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = WikiClient::new("ftp://example.com", "ua", Duration::from_secs(1));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_trims_trailing_slash() {
        let client = WikiClient::new(" https://example.com/api/ ", "ua", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://example.com/api");
    }

    #[tokio::test]
    async fn test_fetch_mapping_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mapping"))
            .and(header("user-agent", "PriceProxy-Test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id": 2, "name": "Cannonball", "limit": 11000}, {"id": 561, "name": "Nature rune"}]"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let entries = client_for(&server).fetch_mapping().await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id().as_deref(), Some("2"));
        assert_eq!(entries[1].name(), Some("Nature rune"));
    }

    #[tokio::test]
    async fn test_fetch_window_parses_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/5m"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data": {"2": {"avgHighPrice": 180, "highPriceVolume": 900, "avgLowPrice": null, "lowPriceVolume": 1200}}, "timestamp": 1700000000}"#,
            ))
            .mount(&server)
            .await;

        let window = client_for(&server).fetch_window(Window::FiveMinute).await.unwrap();

        assert_eq!(window["2"].avg_high_price, Some(180));
        assert_eq!(window["2"].avg_low_price, None);
        assert_eq!(window["2"].total_volume(), 2100);
    }

    #[tokio::test]
    async fn test_fetch_window_without_data_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"error": "maintenance"}"#))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_window(Window::Latest).await;
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mapping"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_mapping().await;
        match result {
            Err(Error::Network(msg)) => assert!(msg.contains("503")),
            other => panic!("expected network error, got {:?}", other.map(|e| e.len())),
        }
    }

    #[tokio::test]
    async fn test_any_window_failure_fails_the_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": {"2": {"high": 5}}}"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/5m"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": {}}"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1h"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/24h"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": {}}"#))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_all_windows().await;
        match result {
            Err(Error::Network(msg)) => assert!(msg.contains("503")),
            Err(other) => panic!("expected network error, got {}", other),
            Ok(_) => panic!("expected the 1h failure to fail the set"),
        }
    }

    #[tokio::test]
    async fn test_malformed_window_fails_the_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": {}}"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/5m"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_all_windows().await;
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_real_latest() {
        let client = WikiClient::new(
            crate::constants::DEFAULT_UPSTREAM_URL,
            crate::constants::DEFAULT_USER_AGENT,
            Duration::from_secs(30),
        )
        .unwrap();

        let latest = client.fetch_window(Window::Latest).await.unwrap();
        assert!(!latest.is_empty(), "Should return some items");
    }
}
