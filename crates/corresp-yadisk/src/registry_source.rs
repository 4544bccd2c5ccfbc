use std::time::Duration;

use async_trait::async_trait;
use corresp_core::{config::Config, errors::RegistryError, ports::RegistrySource, Result};

use crate::{body_snippet, http_client};

/// Fetches the registry CSV with a single GET.
#[derive(Clone, Debug)]
pub struct HttpCsvSource {
    url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HttpCsvSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            timeout,
            http: http_client()?,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.registry_csv_url.clone(), cfg.registry_timeout)
    }
}

#[async_trait]
impl RegistrySource for HttpCsvSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_csv(&self) -> Result<String> {
        let resp = self
            .http
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| RegistryError::FetchFailed(format!("registry request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(RegistryError::FetchFailed(format!(
                "registry returned {status} {}",
                body_snippet(&body)
            ))
            .into());
        }

        resp.text()
            .await
            .map_err(|e| RegistryError::FetchFailed(format!("registry body error: {e}")).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corresp_core::{errors::Error, registry::RegistryStore};
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_csv_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/registry.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/csv")
                    .set_body_string("object_name,folder_url\nObjectA,L1\n"),
            )
            .mount(&server)
            .await;

        let source =
            HttpCsvSource::new(format!("{}/registry.csv", server.uri()), Duration::from_secs(5))
                .unwrap();
        let store = RegistryStore::new(Arc::new(source));
        assert_eq!(store.reload().await.unwrap(), 1);
        assert_eq!(store.get("ObjectA").unwrap().folder_locator, "L1");
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/registry.csv"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let source =
            HttpCsvSource::new(format!("{}/registry.csv", server.uri()), Duration::from_secs(5))
                .unwrap();
        let err = source.fetch_csv().await.unwrap_err();
        assert!(matches!(err, Error::Registry(RegistryError::FetchFailed(ref m)) if m.contains("503")));
    }

    #[tokio::test]
    async fn timeout_is_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("object_name,folder_url\n")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let source = HttpCsvSource::new(server.uri(), Duration::from_millis(50)).unwrap();
        let err = source.fetch_csv().await.unwrap_err();
        assert!(matches!(err, Error::Registry(RegistryError::FetchFailed(_))));
    }
}
