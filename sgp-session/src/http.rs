//! HTTP transport used by the authenticated fetch

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use sgp_core::{ApiConfig, ErrorContext, PortalError, PortalResult};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// A request as handed to the transport
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    /// Absolute URL, or a path relative to the API base URL
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl FetchRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// POST with a JSON body and matching content type
    pub fn post_json<T: Serialize>(url: impl Into<String>, payload: &T) -> PortalResult<Self> {
        let mut request = Self::new(Method::POST, url);
        request.body = Some(serde_json::to_vec(payload)?);
        request.headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(request)
    }

    /// Add a caller header, validating name and value
    pub fn header(mut self, name: &str, value: &str) -> PortalResult<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            PortalError::Validation {
                message: format!("Invalid header name '{}': {}", name, e),
                field: Some("headers".to_string()),
                context: ErrorContext::new("fetch_request").with_operation("header"),
            }
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| PortalError::Validation {
            message: format!("Invalid value for header '{}': {}", name, e),
            field: Some("headers".to_string()),
            context: ErrorContext::new("fetch_request").with_operation("header"),
        })?;

        self.headers.append(header_name, header_value);
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A completed HTTP exchange, whatever its status
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> PortalResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Performs HTTP requests. Non-2xx statuses are responses, not errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: FetchRequest) -> PortalResult<FetchResponse>;
}

/// Create an HTTP client with the configured timeout and user agent
pub fn create_http_client(config: &ApiConfig) -> PortalResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| PortalError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_transport").with_operation("create_client"),
        })
}

/// [`HttpTransport`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> PortalResult<Self> {
        Ok(Self {
            client: create_http_client(config)?,
        })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: FetchRequest) -> PortalResult<FetchResponse> {
        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| PortalError::Network {
            message: format!("Request to {} failed: {}", request.url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_transport")
                .with_operation("send")
                .with_metadata("url", &request.url),
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| PortalError::Network {
            message: format!("Failed to read response body from {}: {}", request.url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_transport")
                .with_operation("read_body")
                .with_metadata("url", &request.url),
        })?;

        debug!(status = status.as_u16(), bytes = body.len(), "Response received");

        Ok(FetchResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

/// Transport that answers from a queue of canned responses and records what
/// it was asked to send. Used by tests and offline hosts.
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    responses: Arc<RwLock<VecDeque<FetchResponse>>>,
    requests: Arc<RwLock<Vec<FetchRequest>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub with a single queued response
    pub fn responding(status: StatusCode, body: &str) -> Self {
        Self {
            responses: Arc::new(RwLock::new(VecDeque::from([FetchResponse::new(
                status,
                body.as_bytes(),
            )]))),
            requests: Arc::default(),
        }
    }

    pub async fn push_response(&self, response: FetchResponse) {
        self.responses.write().await.push_back(response);
    }

    pub async fn requests(&self) -> Vec<FetchRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: FetchRequest) -> PortalResult<FetchResponse> {
        let url = request.url.clone();
        self.requests.write().await.push(request);

        self.responses
            .write()
            .await
            .pop_front()
            .ok_or_else(|| PortalError::Network {
                message: format!("No stubbed response left for {}", url),
                source: None,
                context: ErrorContext::new("stub_transport").with_operation("send"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = FetchRequest::get("/orders")
            .header("X-Line", "2")
            .unwrap()
            .header("Accept", "application/json")
            .unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.headers.get("x-line").unwrap(), "2");
        assert_eq!(request.headers.len(), 2);

        assert!(FetchRequest::get("/orders").header("bad header", "x").is_err());
        assert!(FetchRequest::get("/orders").header("X-Ok", "line\nbreak").is_err());
    }

    #[test]
    fn test_post_json_sets_body_and_content_type() {
        let request =
            FetchRequest::post_json("/batches", &serde_json::json!({ "op": 42 })).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.headers.get(reqwest::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(request.body.as_deref(), Some(br#"{"op":42}"#.as_slice()));
    }

    #[test]
    fn test_response_helpers() {
        let response = FetchResponse::new(StatusCode::OK, r#"{"count":3}"#);
        assert!(response.is_success());
        assert!(!response.is_unauthorized());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["count"], 3);

        let unauthorized = FetchResponse::new(StatusCode::UNAUTHORIZED, "expired");
        assert!(unauthorized.is_unauthorized());
        assert_eq!(unauthorized.text(), "expired");
    }

    #[test]
    fn test_client_creation() {
        assert!(ReqwestTransport::new(&ApiConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_stub_transport_queue() {
        let stub = StubTransport::responding(StatusCode::OK, "first");
        stub.push_response(FetchResponse::new(StatusCode::NOT_FOUND, "second"))
            .await;

        let first = stub.send(FetchRequest::get("http://a/1")).await.unwrap();
        let second = stub.send(FetchRequest::get("http://a/2")).await.unwrap();
        assert_eq!(first.text(), "first");
        assert_eq!(second.status, StatusCode::NOT_FOUND);

        let exhausted = stub.send(FetchRequest::get("http://a/3")).await;
        assert!(matches!(exhausted, Err(PortalError::Network { .. })));
        assert_eq!(stub.requests().await.len(), 3);
    }
}
