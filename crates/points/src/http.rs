//! REST client for the share point service.

use std::env;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::record::{
    Comment, DeleteRequest, DeleteResponse, NewSharePoint, SharePoint, UploadResponse,
};
use crate::store::{BoxFuture, ImageUpload, ImageUploader, SharePointStore, StoreError};
use crate::upload;
use crate::validate::check_record;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// `RAILS_API_BASE` and `RAILS_API_TIMEOUT_SECS`, with defaults.
    pub fn from_env() -> Self {
        let base_url =
            env::var("RAILS_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let timeout_secs = env::var("RAILS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`SharePointStore`] and [`ImageUploader`] backed by the REST service.
pub struct HttpStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(config: ClientConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/points/<id>/<tail..>` with `id` encoded as one path segment.
    fn point_url(&self, id: &str, tail: &[&str]) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| StoreError::Network(format!("invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Network(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "points", id])
            .extend(tail);
        Ok(url)
    }

    /// Resolve a store-relative URL such as `/uploads/x.png` against the base.
    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with('/') {
            self.url(url)
        } else {
            url.to_string()
        }
    }
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Network(format!("request timed out: {e}"))
    } else {
        StoreError::Network(e.to_string())
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("error").or_else(|| v.get("message")))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, StoreError> {
    let status = resp.status();
    let body = resp.bytes().await.map_err(transport_error)?;
    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()));
    }

    let message = error_message(status, &body);
    debug!("store responded {status}: {message}");
    Err(match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            StoreError::Validation(message)
        }
        StatusCode::FORBIDDEN => StoreError::Forbidden(message),
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        _ => StoreError::Remote {
            status: status.as_u16(),
            message,
        },
    })
}

fn checked(point: SharePoint) -> Result<SharePoint, StoreError> {
    check_record(&point).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(point)
}

impl SharePointStore for HttpStore {
    fn list(&self) -> BoxFuture<'_, Result<Vec<SharePoint>, StoreError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.url("/api/points"))
                .send()
                .await
                .map_err(transport_error)?;
            let points: Vec<SharePoint> = read_json(resp).await?;
            // One bad record rejects the whole list.
            let points = points
                .into_iter()
                .map(checked)
                .collect::<Result<Vec<_>, _>>()
                .inspect_err(|e| warn!("discarding share point list: {e}"))?;
            Ok(points)
        })
    }

    fn create(&self, point: NewSharePoint) -> BoxFuture<'_, Result<SharePoint, StoreError>> {
        Box::pin(async move {
            let point = point.validated()?;
            let resp = self
                .client
                .post(self.url("/api/points"))
                .json(&point)
                .send()
                .await
                .map_err(transport_error)?;
            checked(read_json(resp).await?)
        })
    }

    fn add_comment<'a>(
        &'a self,
        id: &'a str,
        comment: Comment,
    ) -> BoxFuture<'a, Result<SharePoint, StoreError>> {
        Box::pin(async move {
            let comment = comment.validated()?;
            let url = self.point_url(id, &["comments"])?;
            let resp = self
                .client
                .post(url)
                .json(&comment)
                .send()
                .await
                .map_err(transport_error)?;
            checked(read_json(resp).await?)
        })
    }

    fn delete<'a>(
        &'a self,
        id: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<bool, StoreError>> {
        Box::pin(async move {
            let url = self.point_url(id, &[])?;
            let resp = self
                .client
                .delete(url)
                .json(&DeleteRequest {
                    password: password.to_string(),
                })
                .send()
                .await
                .map_err(transport_error)?;
            let body: DeleteResponse = read_json(resp).await?;
            Ok(body.success)
        })
    }
}

impl ImageUploader for HttpStore {
    fn upload(&self, files: Vec<ImageUpload>) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        Box::pin(async move {
            upload::check_file_count(files.len())?;
            let mut form = reqwest::multipart::Form::new();
            for file in files {
                file.check()?;
                let part = reqwest::multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|e| StoreError::Validation(e.to_string()))?;
                form = form.part(upload::FIELD_NAME, part);
            }
            let resp = self
                .client
                .post(self.url("/api/upload"))
                .multipart(form)
                .send()
                .await
                .map_err(transport_error)?;
            let body: UploadResponse = read_json(resp).await?;
            Ok(body.urls)
        })
    }
}
