use std::{env, time::Duration};

use crate::{errors::Error, Result};

/// Typed configuration, read from the process environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Registry
    pub registry_csv_url: String,
    pub registry_timeout: Duration,

    // Storage provider
    pub yandex_disk_token: String,
    pub yandex_disk_api_base: String,
    pub list_timeout: Duration,
    pub download_timeout: Duration,
    pub list_page_limit: usize,

    // Response bounds
    pub text_max_chars: usize,
    pub preview_chars: usize,

    // Batch extraction
    pub fulltext_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_csv_url: String::new(),
            registry_timeout: Duration::from_millis(15_000),
            yandex_disk_token: String::new(),
            yandex_disk_api_base: "https://cloud-api.yandex.net/v1/disk".to_string(),
            list_timeout: Duration::from_millis(20_000),
            download_timeout: Duration::from_millis(120_000),
            list_page_limit: 1000,
            text_max_chars: 10_000,
            preview_chars: 800,
            fulltext_concurrency: 4,
        }
    }
}

impl Config {
    /// Reads the environment after `.env` (if any); existing variables win.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env, map, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let registry_csv_url = required(&lookup, "REGISTRY_CSV_URL")?;
        let yandex_disk_token = required(&lookup, "YANDEX_DISK_TOKEN")?;

        let yandex_disk_api_base = lookup("YANDEX_DISK_API_BASE")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.yandex_disk_api_base);

        // Timeout tiers: short for metadata, long for content.
        let registry_timeout = parse_millis(lookup("REGISTRY_TIMEOUT_MS"))
            .unwrap_or(defaults.registry_timeout);
        let list_timeout =
            parse_millis(lookup("LIST_TIMEOUT_MS")).unwrap_or(defaults.list_timeout);
        let download_timeout =
            parse_millis(lookup("DOWNLOAD_TIMEOUT_MS")).unwrap_or(defaults.download_timeout);

        let list_page_limit = parse_usize(lookup("LIST_PAGE_LIMIT"))
            .unwrap_or(defaults.list_page_limit)
            .max(1);

        let text_max_chars =
            parse_usize(lookup("TEXT_MAX_CHARS")).unwrap_or(defaults.text_max_chars);
        let preview_chars = parse_usize(lookup("PREVIEW_CHARS"))
            .unwrap_or(defaults.preview_chars)
            .min(text_max_chars);

        let fulltext_concurrency = parse_usize(lookup("FULLTEXT_CONCURRENCY"))
            .unwrap_or(defaults.fulltext_concurrency)
            .max(1);

        Ok(Self {
            registry_csv_url,
            registry_timeout,
            yandex_disk_token,
            yandex_disk_api_base,
            list_timeout,
            download_timeout,
            list_page_limit,
            text_max_chars,
            preview_chars,
            fulltext_concurrency,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn parse_millis(v: Option<String>) -> Option<Duration> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn parse_usize(v: Option<String>) -> Option<usize> {
    v.and_then(|s| s.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn requires_registry_url_and_token() {
        let err = Config::from_lookup(lookup_from(&[("YANDEX_DISK_TOKEN", "t")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("REGISTRY_CSV_URL", "http://x/r.csv")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[
            ("REGISTRY_CSV_URL", "http://x/r.csv"),
            ("YANDEX_DISK_TOKEN", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn applies_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("REGISTRY_CSV_URL", "http://x/r.csv"),
            ("YANDEX_DISK_TOKEN", "t"),
        ]))
        .unwrap();
        assert_eq!(cfg.list_page_limit, 1000);
        assert_eq!(cfg.text_max_chars, 10_000);
        assert_eq!(cfg.preview_chars, 800);
        assert!(cfg.list_timeout < cfg.download_timeout);
        assert_eq!(cfg.yandex_disk_api_base, "https://cloud-api.yandex.net/v1/disk");
    }

    #[test]
    fn overrides_and_clamps() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("REGISTRY_CSV_URL", "http://x/r.csv"),
            ("YANDEX_DISK_TOKEN", "t"),
            ("YANDEX_DISK_API_BASE", "http://127.0.0.1:9000/v1/disk/"),
            ("TEXT_MAX_CHARS", "500"),
            ("PREVIEW_CHARS", "900"),
            ("FULLTEXT_CONCURRENCY", "0"),
            ("DOWNLOAD_TIMEOUT_MS", "5000"),
        ]))
        .unwrap();
        assert_eq!(cfg.yandex_disk_api_base, "http://127.0.0.1:9000/v1/disk");
        assert_eq!(cfg.text_max_chars, 500);
        assert_eq!(cfg.preview_chars, 500);
        assert_eq!(cfg.fulltext_concurrency, 1);
        assert_eq!(cfg.download_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn missing_variable_is_named_in_error() {
        let err = Config::from_lookup(lookup_from(&[("REGISTRY_CSV_URL", "http://x/r.csv")]))
            .unwrap_err();
        assert!(err.to_string().contains("YANDEX_DISK_TOKEN"), "{err}");
    }
}
