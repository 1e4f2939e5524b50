//! HTTP transport
//!
//! One network attempt per call: the request races a deadline, the loser is
//! cancelled, and every failure mode (timeout, connection error, non-2xx) is
//! classified into a single [`ApiError`] for the caller. Nothing here retries.

use crate::config::ClientConfig;
use crate::credentials::CredentialProvider;
use crate::error::{ApiError, ApiResult};
use crate::url::UrlBuilder;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// List total-count response header
const X_TOTAL_COUNT: &str = "x-total-count";

/// Per-call options layered over the transport's configuration
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Deadline override; falls back to the configured default
    pub timeout: Option<Duration>,
    /// Leave the Authorization header off even when a token is available
    pub skip_auth: bool,
    /// Extra headers; anything set here wins over the JSON defaults
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// Options with all defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the deadline for this call
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send the request unauthenticated
    #[must_use]
    pub fn with_skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Add a header, replacing any previous value for the same name
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A successfully classified response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The origin declared a JSON content type
    Json(Value),
    /// Anything else comes through as plain text
    Text(String),
}

impl Body {
    /// Extract the JSON value, parsing text bodies on demand
    pub fn into_json(self) -> ApiResult<Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }
}

/// A 2xx response: classified body plus the origin's response headers
#[derive(Debug)]
pub struct ApiResponse {
    /// Response headers, kept for count extraction and caller inspection
    pub headers: HeaderMap,
    /// Classified body
    pub body: Body,
}

impl ApiResponse {
    /// The `X-Total-Count` header value, when the origin sent one
    #[must_use]
    pub fn total_count(&self) -> Option<&str> {
        self.headers
            .get(X_TOTAL_COUNT)
            .and_then(|value| value.to_str().ok())
    }

    /// Consume the response, keeping only the JSON body
    pub fn into_json(self) -> ApiResult<Value> {
        self.body.into_json()
    }
}

enum Payload {
    None,
    Json(Value),
    Multipart(Form),
}

/// HTTP transport bound to one configuration and one credential source
///
/// Construct one per backend; there is no process-wide instance. Cloning is
/// cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct Transport {
    http: Client,
    config: Arc<ClientConfig>,
    credentials: Arc<dyn CredentialProvider>,
    urls: UrlBuilder,
}

impl Transport {
    /// Create a transport for the given configuration and credential source
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> ApiResult<Self> {
        config.validate()?;

        // No client-level timeout: the per-call race owns the deadline.
        let http = Client::builder().build().map_err(ApiError::Network)?;
        let urls = UrlBuilder::new(config.base_url.clone());

        Ok(Self {
            http,
            config: Arc::new(config),
            credentials,
            urls,
        })
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL builder bound to the configured base
    #[must_use]
    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    /// Perform a GET request
    pub async fn get(&self, endpoint: &str, options: &RequestOptions) -> ApiResult<ApiResponse> {
        self.execute(Method::GET, endpoint, Payload::None, options)
            .await
    }

    /// Perform a POST request with a JSON body
    pub async fn post<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let payload = Payload::Json(serde_json::to_value(body)?);
        self.execute(Method::POST, endpoint, payload, options).await
    }

    /// Perform a PUT request with a JSON body
    pub async fn put<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let payload = Payload::Json(serde_json::to_value(body)?);
        self.execute(Method::PUT, endpoint, payload, options).await
    }

    /// Perform a PATCH request with a JSON body
    pub async fn patch<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let payload = Payload::Json(serde_json::to_value(body)?);
        self.execute(Method::PATCH, endpoint, payload, options)
            .await
    }

    /// Perform a DELETE request
    pub async fn delete(&self, endpoint: &str, options: &RequestOptions) -> ApiResult<ApiResponse> {
        self.execute(Method::DELETE, endpoint, Payload::None, options)
            .await
    }

    /// Upload a multipart form
    ///
    /// No Content-Type default is applied here; the multipart encoder must
    /// set its own boundary.
    pub async fn upload(
        &self,
        endpoint: &str,
        form: Form,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse> {
        self.execute(Method::POST, endpoint, Payload::Multipart(form), options)
            .await
    }

    /// Execute a single request, racing it against the deadline
    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        payload: Payload,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let url = self.urls.build(endpoint);
        let request_id = Uuid::new_v4().to_string();
        let timeout = options.timeout.unwrap_or(self.config.timeout);
        let multipart = matches!(payload, Payload::Multipart(_));

        let mut headers = options.headers.clone();
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        // Multipart bodies must carry the encoder's boundary instead.
        if !multipart && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if !options.skip_auth && !headers.contains_key(AUTHORIZATION) {
            // One token snapshot per call; a concurrent refresh is not
            // observed mid-request.
            if let Some(token) = self.credentials.token() {
                if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                    headers.insert(AUTHORIZATION, value);
                }
            }
        }

        let mut request = self
            .http
            .request(method.clone(), &url)
            .headers(headers)
            .header(X_REQUEST_ID, &request_id);

        request = match payload {
            Payload::None => request,
            Payload::Json(value) => request.json(&value),
            Payload::Multipart(form) => request.multipart(form),
        };

        debug!(
            request_id = %request_id,
            method = %method,
            url = %url,
            timeout_ms = timeout.as_millis(),
            "Issuing request"
        );

        let start = Instant::now();
        let outcome = tokio::time::timeout(timeout, async {
            let response = request.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, headers, content_type, text))
        })
        .await;

        // Timeout drops the in-flight future, cancelling the connection.
        let Ok(result) = outcome else {
            warn!(
                request_id = %request_id,
                url = %url,
                timeout_ms = timeout.as_millis(),
                "Request timed out"
            );
            return Err(ApiError::Timeout);
        };

        let (status, headers, content_type, text) = result.map_err(|error| {
            warn!(request_id = %request_id, url = %url, error = %error, "Request failed");
            ApiError::Network(error)
        })?;
        let elapsed = start.elapsed();

        if !status.is_success() {
            warn!(
                request_id = %request_id,
                url = %url,
                status = status.as_u16(),
                elapsed_ms = elapsed.as_millis(),
                "Origin returned an error status"
            );
            let payload = parse_error_payload(&text);
            return Err(ApiError::http(status.as_u16(), payload));
        }

        debug!(
            request_id = %request_id,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis(),
            "Request succeeded"
        );

        // Origins commonly answer DELETE with a JSON content type and no
        // body at all; an empty body is never a parse failure.
        let body = if !text.is_empty() && content_type.contains("json") {
            Body::Json(serde_json::from_str(&text)?)
        } else {
            Body::Text(text)
        };

        Ok(ApiResponse { headers, body })
    }
}

/// Keep whatever the origin sent on errors: parsed JSON when possible, the
/// raw text otherwise, nothing for an empty body.
fn parse_error_payload(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }
    serde_json::from_str(text)
        .ok()
        .or_else(|| Some(Value::String(text.to_string())))
}
