//! Typed client for the inventory REST API

mod adjustments;
mod locations;
mod products;
mod received;
mod serials;
mod staging;
mod transfers;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};

/// Inventory API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client against a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Send a request and turn non-success statuses into `ClientError::Server`
    async fn send(&self, builder: RequestBuilder, method: &Method, path: &str) -> ClientResult<Response> {
        tracing::debug!(%method, path, "API request");

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "API request failed");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "API response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%method, path, status = status.as_u16(), "API request rejected");
        Err(ClientError::from_server(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("{}: {}", path, e)))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self
            .send(self.request(Method::GET, path), &Method::GET, path)
            .await?;
        Self::decode(response, path).await
    }

    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).query(query);
        let response = self.send(builder, &Method::GET, path).await?;
        Self::decode(response, path).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).json(body);
        let response = self.send(builder, &Method::POST, path).await?;
        Self::decode(response, path).await
    }

    /// POST whose response body is ignored
    pub(crate) async fn post_no_content<B>(&self, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).json(body);
        self.send(builder, &Method::POST, path).await?;
        Ok(())
    }

    pub(crate) async fn put_no_content<B>(&self, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path).json(body);
        self.send(builder, &Method::PUT, path).await?;
        Ok(())
    }
}
