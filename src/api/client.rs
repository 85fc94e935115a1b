//! HTTP client for the Comprartir REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use super::{ApiError, RemoteApi};
use crate::config::ApiConfig;
use crate::models::Page;
use crate::sync::Resource;

/// REST client shared by every resource type.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    /// Creates a client with explicit parameters.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Creates a client from config.
    ///
    /// Returns an error if no base URL is configured.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| ApiError::NotConfigured("no api.base_url set".to_string()))?;
        Self::new(
            base_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Builds the base URL, adding `http://` to a bare host and dropping any
/// trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::NotConfigured("api.base_url is empty".to_string()));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else if trimmed.contains("://") {
        Err(ApiError::NotConfigured(format!(
            "unsupported scheme in '{}'",
            trimmed
        )))
    } else {
        Ok(format!("http://{}", trimmed))
    }
}

/// Collection path with the parent id percent-encoded as one path segment.
fn collection_path<R: Resource>(parent: Option<&str>) -> String {
    let parent = parent.map(urlencoding::encode);
    R::collection_path(parent.as_deref())
}

fn item_path<R: Resource>(parent: Option<&str>, id: &str) -> String {
    format!(
        "{}/{}",
        collection_path::<R>(parent),
        urlencoding::encode(id)
    )
}

#[async_trait]
impl<R: Resource> RemoteApi<R> for HttpApi {
    async fn fetch_page(
        &self,
        parent: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Page<R::Wire>, ApiError> {
        let path = collection_path::<R>(parent);
        tracing::debug!(resource = R::NAME, page, per_page, "GET {}", path);
        let builder = self
            .request(Method::GET, &path)
            .query(&[("page", page), ("per_page", per_page)]);
        self.send_json(builder).await
    }

    async fn create(&self, parent: Option<&str>, input: &R::Input) -> Result<R::Wire, ApiError> {
        let path = collection_path::<R>(parent);
        tracing::debug!(resource = R::NAME, "POST {}", path);
        let builder = self.request(Method::POST, &path).json(input);
        self.send_json(builder).await
    }

    async fn update(
        &self,
        parent: Option<&str>,
        id: &str,
        input: &R::Input,
    ) -> Result<R::Wire, ApiError> {
        let path = item_path::<R>(parent, id);
        tracing::debug!(resource = R::NAME, "PUT {}", path);
        let builder = self.request(Method::PUT, &path).json(input);
        self.send_json(builder).await
    }

    async fn delete(&self, parent: Option<&str>, id: &str) -> Result<(), ApiError> {
        let path = item_path::<R>(parent, id);
        tracing::debug!(resource = R::NAME, "DELETE {}", path);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}
