//! Backend REST API Client
//!
//! Preconfigured HTTP client: base URL, bearer token injection,
//! per-request timeout and a request id header on every call.

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use super::dto::ErrorBody;
use super::error::{ClientError, ClientResult};

/// Header carrying a per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Configuration for the backend client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the backend API (e.g., "http://localhost:5000/api")
    pub base_url: String,
    /// Bearer token sent as `Authorization`, if any
    pub token: Option<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            token: None,
            request_timeout_secs: 30,
        }
    }
}

/// Dashboard backend client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "Backend request");

        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, request_id);

        if let Some(token) = self.config.token.as_deref().filter(|t| !t.is_empty()) {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        builder
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await.map_err(ClientError::from_transport)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<ErrorBody>(&text).ok();
        let error = body
            .as_ref()
            .and_then(|b| b.error.clone())
            .filter(|e| !e.trim().is_empty());
        let message = error
            .clone()
            .or_else(|| body.and_then(|b| b.message))
            .unwrap_or(text);

        Err(ClientError::Api {
            status,
            error,
            message,
        })
    }

    /// Decode a body; an empty body or JSON `null` yields `None`
    async fn decode_optional<T: DeserializeOwned>(response: Response) -> ClientResult<Option<T>> {
        let bytes = response.bytes().await.map_err(ClientError::from_transport)?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        Self::decode_optional(response)
            .await?
            .ok_or_else(|| ClientError::Decode("empty response body".to_string()))
    }

    /// `GET` and decode the body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::decode(response).await
    }

    /// `GET` with query parameters
    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        Self::decode(response).await
    }

    /// `GET` where the backend may legitimately answer with nothing
    pub async fn get_optional_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Option<T>> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::decode_optional(response).await
    }

    /// `POST` a JSON body, ignoring the response body
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<()> {
        self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(())
    }

    /// `PUT` a JSON body, ignoring the response body
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<()> {
        self.send(self.request(Method::PUT, path).json(body)).await?;
        Ok(())
    }

    /// `DELETE`, ignoring the response body
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    /// `DELETE` and decode the (possibly empty) body
    pub async fn delete_json<T: DeserializeOwned + Default>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(self.request(Method::DELETE, path)).await?;
        Ok(Self::decode_optional(response).await?.unwrap_or_default())
    }
}
