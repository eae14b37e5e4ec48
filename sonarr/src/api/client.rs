use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::error::ApiError;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Sonarr v3 API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Client {
    /// `url` is the Sonarr root, e.g. `http://localhost:8989`
    pub fn new(url: &str, api_key: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(url)?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: format!("{}/api/v3", parsed.as_str().trim_end_matches('/')),
                api_key: api_key.to_string(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.send::<()>(Method::GET, path, None).await?;
        parse(&text)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let text = self.send(Method::POST, path, Some(body)).await?;
        parse(&text)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let text = self.send(Method::PUT, path, Some(body)).await?;
        parse(&text)
    }

    /// Sonarr answers deletes with an empty body
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, path, None).await.map(|_| ())
    }

    pub fn notifications(&self) -> super::notification::NotificationsApi<'_> {
        super::notification::NotificationsApi::new(self)
    }

    pub fn root_folders(&self) -> super::root_folder::RootFoldersApi<'_> {
        super::root_folder::RootFoldersApi::new(self)
    }

    pub fn import_lists(&self) -> super::import_list::ImportListsApi<'_> {
        super::import_list::ImportListsApi::new(self)
    }

    pub fn import_list_exclusions(
        &self,
    ) -> super::import_list_exclusion::ImportListExclusionsApi<'_> {
        super::import_list_exclusion::ImportListExclusionsApi::new(self)
    }

    pub fn series(&self) -> super::series::SeriesApi<'_> {
        super::series::SeriesApi::new(self)
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("{} request to: {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method, &url)
            .header(API_KEY_HEADER, &self.inner.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        let text = response.text().await?;
        if !status.is_success() {
            tracing::error!("API error response ({}): {}", status, text);
            return Err(ApiError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(text)
    }
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
        ApiError::ParseError(e.to_string())
    })
}
