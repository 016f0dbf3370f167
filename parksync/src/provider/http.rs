//! HTTP client abstraction for testability

use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::types::ProviderError;

/// Default request timeout for upstream providers.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A GET request against an upstream provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Fully-qualified URL including query string.
    pub url: String,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Build a request from a base URL and query parameters.
    pub fn get(base: &str, params: &[(&str, String)]) -> Result<Self, ProviderError> {
        let url = reqwest::Url::parse_with_params(base, params)
            .map_err(|e| ProviderError::HttpError(format!("Invalid URL {}: {}", base, e)))?;
        Ok(Self {
            url: url.to_string(),
            headers: Vec::new(),
        })
    }

    /// Add a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error for transport failures and
    /// non-success statuses.
    fn get(&self, request: HttpRequest) -> BoxFuture<'_, Result<Bytes, ProviderError>>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(format!("parksync/{}", crate::VERSION))
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, ProviderError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ProviderError::HttpError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ProviderError::HttpError(format!("Invalid header value: {}", e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Drop the query string, which carries API keys for most providers.
fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

impl AsyncHttpClient for ReqwestClient {
    fn get(&self, request: HttpRequest) -> BoxFuture<'_, Result<Bytes, ProviderError>> {
        Box::pin(async move {
            let headers = header_map(&request.headers)?;
            let response = self
                .client
                .get(&request.url)
                .headers(headers)
                .send()
                .await
                .map_err(|e| {
                    ProviderError::HttpError(format!("Request failed: {}", e.without_url()))
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::Status {
                    status: status.as_u16(),
                    url: without_query(&request.url).to_string(),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| {
                    ProviderError::HttpError(format!("Failed to read response: {}", e.without_url()))
                })
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Mock HTTP client that records requests and replays a fixed response.
    pub struct MockAsyncHttpClient {
        pub response: Result<Bytes, ProviderError>,
        pub requests: Mutex<Vec<HttpRequest>>,
    }

    impl MockAsyncHttpClient {
        pub fn ok(body: &'static [u8]) -> Self {
            Self {
                response: Ok(Bytes::from_static(body)),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.lock().last().cloned()
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        fn get(&self, request: HttpRequest) -> BoxFuture<'_, Result<Bytes, ProviderError>> {
            self.requests.lock().push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    #[test]
    fn test_request_encodes_query_params() {
        let request = HttpRequest::get(
            "https://example.com/search",
            &[("query", "Zion National Park".to_string())],
        )
        .unwrap();
        assert_eq!(
            request.url,
            "https://example.com/search?query=Zion+National+Park"
        );
    }

    #[test]
    fn test_request_rejects_invalid_base() {
        let err = HttpRequest::get("not a url", &[]).unwrap_err();
        assert!(matches!(err, ProviderError::HttpError(_)));
    }

    #[test]
    fn test_without_query_hides_api_key() {
        assert_eq!(
            without_query("https://api.nasa.gov/planetary/earth/assets?lat=1&api_key=SECRET"),
            "https://api.nasa.gov/planetary/earth/assets"
        );
        assert_eq!(without_query("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_header_map_rejects_bad_names() {
        let headers = vec![("bad header".to_string(), "v".to_string())];
        assert!(header_map(&headers).is_err());
    }

    #[tokio::test]
    async fn test_mock_client_records_requests() {
        let mock = MockAsyncHttpClient::ok(b"{}");
        let request = HttpRequest::get("https://example.com", &[])
            .unwrap()
            .with_header("Authorization", "Client-ID abc");

        let body = mock.get(request.clone()).await.unwrap();
        assert_eq!(&body[..], b"{}");
        assert_eq!(mock.last_request(), Some(request));
    }
}
