use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::AUTHORIZATION, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use corresp_core::{
    config::Config, domain::RemoteFileMeta, errors::StorageError, ports::StorageClient, Result,
};

use crate::{body_snippet, http_client};

/// Yandex Disk public-resources client.
///
/// The OAuth token is only sent to the API itself; pre-signed download
/// hrefs are fetched without it.
#[derive(Clone, Debug)]
pub struct YandexDiskClient {
    api_base: String,
    token: String,
    list_timeout: Duration,
    download_timeout: Duration,
    page_limit: usize,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PublicResource {
    #[serde(rename = "_embedded")]
    embedded: Option<ResourceList>,
}

#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    items: Vec<ResourceItem>,
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ResourceItem {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    path: String,
    modified: Option<DateTime<Utc>>,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct DownloadLink {
    href: Option<String>,
}

impl YandexDiskClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            api_base: cfg.yandex_disk_api_base.trim_end_matches('/').to_string(),
            token: cfg.yandex_disk_token.clone(),
            list_timeout: cfg.list_timeout,
            download_timeout: cfg.download_timeout,
            page_limit: cfg.list_page_limit,
            http: http_client()?,
        })
    }

    fn api_get(&self, endpoint: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{endpoint}", self.api_base))
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .timeout(self.list_timeout)
    }

    async fn request_href(&self, locator: &str, path: &str) -> Result<String> {
        let resp = send(
            self.api_get("/public/resources/download")
                .query(&[("public_key", locator), ("path", path)]),
        )
        .await?;
        if !resp.status().is_success() {
            return Err(transport_status("download link", resp).await.into());
        }

        let link: DownloadLink = resp
            .json()
            .await
            .map_err(|e| StorageError::Transport(format!("download link json error: {e}")))?;

        match link.href {
            Some(href) if !href.trim().is_empty() => Ok(href),
            _ => Err(StorageError::NoDownloadLink.into()),
        }
    }
}

#[async_trait]
impl StorageClient for YandexDiskClient {
    async fn list_files(&self, locator: &str) -> Result<Vec<RemoteFileMeta>> {
        let limit = self.page_limit.to_string();
        let resp = send(
            self.api_get("/public/resources")
                .query(&[("public_key", locator), ("limit", limit.as_str())]),
        )
        .await?;

        match resp.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(StorageError::Unauthorized.into())
            }
            StatusCode::NOT_FOUND => return Err(StorageError::NotFound.into()),
            _ => return Err(transport_status("listing", resp).await.into()),
        }

        let resource: PublicResource = resp
            .json()
            .await
            .map_err(|e| StorageError::Transport(format!("listing json error: {e}")))?;

        let Some(list) = resource.embedded else {
            return Ok(Vec::new());
        };

        if let Some(total) = list.total {
            if total > list.items.len() {
                tracing::warn!(
                    "listing truncated for {locator}: {} of {total} entries returned",
                    list.items.len()
                );
            }
        }

        let files: Vec<RemoteFileMeta> = list
            .items
            .into_iter()
            .filter(|item| item.kind == "file")
            .map(|item| RemoteFileMeta {
                name: item.name,
                path: item.path,
                modified: item.modified.unwrap_or_default(),
                size: item.size,
                mime_type: item.mime_type,
            })
            .collect();

        tracing::debug!("listed {} files for {locator}", files.len());
        Ok(files)
    }

    async fn download_file(&self, locator: &str, path: &str) -> Result<Vec<u8>> {
        let href = self.request_href(locator, path).await?;

        // Pre-signed: no Authorization header.
        let resp = send(self.http.get(&href).timeout(self.download_timeout)).await?;
        if !resp.status().is_success() {
            return Err(transport_status("download", resp).await.into());
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| StorageError::Transport(format!("download body error: {e}")))?;
        Ok(bytes.to_vec())
    }
}

async fn send(req: RequestBuilder) -> Result<Response> {
    req.send().await.map_err(|e| {
        let what = if e.is_timeout() { "timeout" } else { "request error" };
        StorageError::Transport(format!("storage {what}: {e}")).into()
    })
}

async fn transport_status(step: &str, resp: Response) -> StorageError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    StorageError::Transport(format!("{step} returned {status} {}", body_snippet(&body)))
}
