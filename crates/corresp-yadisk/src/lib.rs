//! HTTP adapters for the correspondence pipeline.
//!
//! - [`HttpCsvSource`]: registry CSV over plain HTTP GET.
//! - [`YandexDiskClient`]: Yandex Disk public-resources API (listing + two-step download).

mod disk;
mod registry_source;

pub use disk::YandexDiskClient;
pub use registry_source::HttpCsvSource;

use corresp_core::{errors::Error, Result};

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("corresp/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::External(format!("http client build error: {e}")))
}

/// First 200 chars of a response body, for error messages.
fn body_snippet(body: &str) -> String {
    body.chars().take(200).collect()
}
