use crate::config::ClientConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A single backend call: `makeRequest(path, method, body?, authenticated?)`.
///
/// `bearer` is filled in by the caller for authenticated calls; the transport
/// never looks up credentials on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(
            serde_json::to_value(body)
                .map_err(|e| AppError::InvalidRequest(format!("Unserializable body: {}", e)))?,
        );
        Ok(self)
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer.is_some()
    }
}

/// Request/response seam between the stores and the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the decoded JSON body (`Value::Null` for an
    /// empty body). Non-2xx responses are errors.
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}

/// Decode a transport response into a typed value.
pub async fn send_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: ApiRequest,
) -> Result<T> {
    let path = request.path.clone();
    let value = transport.send(request).await?;
    serde_json::from_value(value)
        .map_err(|e| AppError::InvalidResponse(format!("{}: {}", path, e)))
}

/// Percent-encoded `/{collection}/{id}` path.
pub fn item_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, urlencoding::encode(id))
}

/// JSON-over-HTTP transport backed by reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpTransport {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = self.url(&request.path);

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            authenticated = request.is_authenticated(),
            "API request: {} {}",
            request.method, request.path
        );

        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(ref token) = request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            tracing::warn!(
                status = %status,
                method = %request.method,
                path = %request.path,
                "API HTTP error {}: {}",
                status, message
            );
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            AppError::InvalidResponse(format!("Failed to parse {} response: {}", request.path, e))
        })
    }
}

/// Prefer the backend's `message` (or `error`) field over the raw body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "error"]
            .iter()
            .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    match from_json {
        Some(message) if !message.is_empty() => message,
        _ if body.trim().is_empty() => format!("HTTP {}", status),
        _ => format!("HTTP {}: {}", status, body.trim()),
    }
}
