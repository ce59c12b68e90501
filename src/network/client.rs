//! HTTP client wrapper - shapes requests, attaches credentials, normalizes responses

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, ConfigError};
use crate::models::HttpMethod;
use crate::network::request::ApiRequest;
use crate::storage::TokenStore;

/// Client for the carbon capture network API
///
/// Cheap to clone; clones share the connection pool and token store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    /// `base_url` as text with any trailing `/` removed; paths are appended to it
    base: String,
    timeout_secs: u64,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ConfigError> {
        let http = create_client(&config)?;
        let base_url = config.base_url().clone();
        let base = base_url.as_str().trim_end_matches('/').to_string();

        Ok(ApiClient {
            http,
            base_url,
            base,
            timeout_secs: config.timeout.as_secs(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL a request is sent to
    pub fn url_for(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.base, request.path_and_query())
    }

    /// Send a request and decode the JSON response into `T`.
    ///
    /// Every failure is logged here before being returned.
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let url = self.url_for(&request);
        let method = request.method;

        match self.dispatch(&url, request).await {
            Ok(value) => Ok(value),
            Err(e) => {
                log_failure(method, &url, &e);
                Err(e)
            }
        }
    }

    /// Like [`request`](Self::request), attaching `body` as JSON first
    pub async fn request_json<T, B>(&self, request: ApiRequest, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let method = request.method;
        let url = self.url_for(&request);
        match request.json(body) {
            Ok(request) => self.request(request).await,
            Err(e) => {
                log_failure(method, &url, &e);
                Err(e)
            }
        }
    }

    async fn dispatch<T: DeserializeOwned>(&self, url: &str, request: ApiRequest) -> ApiResult<T> {
        let headers = self.build_headers(&request)?;

        let mut req_builder = self
            .http
            .request(request.method.into(), url)
            .headers(headers);

        if let Some(body) = &request.body {
            let body = serde_json::to_vec(body).map_err(ApiError::Encode)?;
            req_builder = req_builder.body(body);
        }

        tracing::info!(method = request.method.as_str(), url = %url, "Executing request");

        let resp = req_builder
            .send()
            .await
            .map_err(|e| ApiError::transport(e, self.timeout_secs))?;

        let status = resp.status();
        let body = resp.bytes().await;

        if !status.is_success() {
            // An unreadable error body is treated like an unparseable one
            let body = body.unwrap_or_else(|e| {
                tracing::warn!(url = %url, status = status.as_u16(), error = %e, "Could not read error body");
                Default::default()
            });
            return Err(http_error(status.as_u16(), &body));
        }

        let body = body.map_err(|e| ApiError::transport(e, self.timeout_secs))?;
        tracing::info!(url = %url, status = status.as_u16(), bytes = body.len(), "Request completed");

        decode_body(status.as_u16(), &body)
    }

    /// Default headers, then caller headers, then the stored bearer token
    fn build_headers(&self, request: &ApiRequest) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for header in &request.headers {
            let name = HeaderName::from_bytes(header.key.as_bytes()).map_err(|_| {
                ApiError::InvalidHeader {
                    name: header.key.clone(),
                }
            })?;
            let value = HeaderValue::from_str(&header.value).map_err(|_| {
                ApiError::InvalidHeader {
                    name: header.key.clone(),
                }
            })?;
            headers.insert(name, value);
        }

        if let Some(token) = self.tokens.load()? {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ApiError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

fn log_failure(method: HttpMethod, url: &str, e: &ApiError) {
    tracing::error!(
        method = method.as_str(),
        url = %url,
        status = ?e.status(),
        kind = ?e.kind(),
        error = %e,
        "API request failed"
    );
}

/// Shape a non-2xx response into an error, preferring the server's `message`
fn http_error(status: u16, body: &[u8]) -> ApiError {
    let parsed: Value = serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Default::default()));
    let message = parsed
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status));

    ApiError::Http { status, message }
}

/// Decode a successful body; an empty body decodes as JSON `null`
fn decode_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> ApiResult<T> {
    let result = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    result.map_err(|source| ApiError::Decode { status, source })
}

/// Create an HTTP client with the configured timeout
pub fn create_client(config: &ClientConfig) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("carbonlink/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ConfigError::Client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Header;
    use crate::storage::MemoryTokenStore;
    use serde_json::json;

    fn client_with(tokens: MemoryTokenStore) -> ApiClient {
        let config = ClientConfig::new("http://host/api/").unwrap();
        ApiClient::new(config, Arc::new(tokens)).unwrap()
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let client = client_with(MemoryTokenStore::new());
        let req = ApiRequest::get("/units/u1");
        assert_eq!(client.url_for(&req), "http://host/api/units/u1");
    }

    #[test]
    fn test_headers_without_token() {
        let client = client_with(MemoryTokenStore::new());
        let headers = client.build_headers(&ApiRequest::get("/units")).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_headers_with_token_and_caller_overrides() {
        let client = client_with(MemoryTokenStore::with_token("abc"));
        let mut req = ApiRequest::get("/units").header("X-Request-Source", "console");
        req.headers.push(Header::new("Content-Type", "application/merge-patch+json"));

        let headers = client.build_headers(&req).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get("x-request-source").unwrap(), "console");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/merge-patch+json");
    }

    #[test]
    fn test_token_read_on_every_call() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let config = ClientConfig::new("http://host/api").unwrap();
        let client = ApiClient::new(config, tokens.clone()).unwrap();

        let req = ApiRequest::get("/auth/me");
        assert!(client.build_headers(&req).unwrap().get(AUTHORIZATION).is_none());

        tokens.save("fresh").unwrap();
        assert_eq!(
            client.build_headers(&req).unwrap().get(AUTHORIZATION).unwrap(),
            "Bearer fresh"
        );
    }

    #[test]
    fn test_invalid_caller_header() {
        let client = client_with(MemoryTokenStore::new());
        let req = ApiRequest::get("/units").header("bad header", "x");
        assert!(matches!(
            client.build_headers(&req),
            Err(ApiError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_http_error_message_extraction() {
        let err = http_error(404, br#"{"message":"not found"}"#);
        assert_eq!(err.to_string(), "not found");

        let err = http_error(500, b"<html>Internal Server Error</html>");
        assert_eq!(err.to_string(), "HTTP 500");

        let err = http_error(400, br#"{"message":""}"#);
        assert_eq!(err.to_string(), "HTTP 400");

        let err = http_error(422, br#"{"message":{"field":"email"}}"#);
        assert_eq!(err.to_string(), "HTTP 422");
    }

    #[test]
    fn test_decode_body() {
        let value: Value = decode_body(200, br#"{"id":"u1"}"#).unwrap();
        assert_eq!(value, json!({ "id": "u1" }));

        let value: Value = decode_body(204, b"").unwrap();
        assert_eq!(value, Value::Null);

        let err = decode_body::<Value>(200, b"not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode { status: 200, .. }));
    }
}
