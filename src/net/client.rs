use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use super::error::ApiRequestError;
use crate::config::NetworkConfig;

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Executes HTTP requests. The transport behind it is opaque to callers.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: reqwest::Request) -> Result<HttpResponse, ApiRequestError>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    async fn execute(&self, request: reqwest::Request) -> Result<HttpResponse, ApiRequestError> {
        (**self).execute(request).await
    }
}

/// `HttpClient` backed by a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn from_config(config: &NetworkConfig) -> Result<Self, ApiRequestError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds.into()))
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| ApiRequestError::Generic(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: reqwest::Request) -> Result<HttpResponse, ApiRequestError> {
        let url = request.url().to_string();
        let transport = |source| ApiRequestError::Transport {
            url: url.clone(),
            source,
        };

        let response = self.client.execute(request).await.map_err(transport)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
