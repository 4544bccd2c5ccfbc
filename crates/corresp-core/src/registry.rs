//! Registry Store: object name -> remote folder locator.
//!
//! The registry is an immutable snapshot behind an `Arc`. Reloads build a new
//! snapshot off to the side and swap it in; readers see the old or the new
//! snapshot in full. Concurrent reloads are serialized by a single writer lock.

use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};

use tokio::sync::Mutex;

use crate::{domain::ObjectRecord, errors::RegistryError, ports::RegistrySource, Result};

pub const OBJECT_NAME_COLUMN: &str = "object_name";
pub const FOLDER_URL_COLUMN: &str = "folder_url";

/// Ordered registry snapshot; order is CSV row order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    records: Vec<ObjectRecord>,
}

impl Registry {
    pub fn new(records: Vec<ObjectRecord>) -> Self {
        Self { records }
    }

    /// Parse registry CSV with a header row.
    ///
    /// Requires `object_name` and `folder_url` columns; other columns are
    /// ignored. Rows with either field blank (after trimming) are skipped.
    pub fn parse_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| RegistryError::FetchFailed(format!("csv header error: {e}")))?
            .clone();

        let column = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted)
        };
        let (name_idx, url_idx) = match (column(OBJECT_NAME_COLUMN), column(FOLDER_URL_COLUMN)) {
            (Some(n), Some(u)) => (n, u),
            (n, u) => {
                let mut missing = Vec::new();
                if n.is_none() {
                    missing.push(OBJECT_NAME_COLUMN.to_string());
                }
                if u.is_none() {
                    missing.push(FOLDER_URL_COLUMN.to_string());
                }
                return Err(RegistryError::MissingColumns(missing).into());
            }
        };

        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut skipped = 0usize;

        for (row, result) in reader.records().enumerate() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("registry row {} unreadable: {e}", row + 1);
                    skipped += 1;
                    continue;
                }
            };

            let name = record.get(name_idx).map(str::trim).unwrap_or("");
            let locator = record.get(url_idx).map(str::trim).unwrap_or("");
            if name.is_empty() || locator.is_empty() {
                skipped += 1;
                continue;
            }

            if !seen.insert(name.to_string()) {
                tracing::warn!("registry has duplicate object_name {name:?}; first row wins");
            }

            records.push(ObjectRecord {
                name: name.to_string(),
                folder_locator: locator.to_string(),
            });
        }

        if skipped > 0 {
            tracing::debug!("registry skipped {skipped} incomplete rows");
        }

        Ok(Self { records })
    }

    /// Exact-match lookup. With duplicate names the first row wins.
    pub fn get(&self, name: &str) -> Option<&ObjectRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn records(&self) -> &[ObjectRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct RegistryStore {
    source: Arc<dyn RegistrySource>,
    snapshot: RwLock<Arc<Registry>>,
    reload_lock: Mutex<()>,
}

impl RegistryStore {
    /// Create a store with an empty snapshot. Call [`RegistryStore::reload`]
    /// before serving lookups.
    pub fn new(source: Arc<dyn RegistrySource>) -> Self {
        Self::with_snapshot(source, Registry::default())
    }

    pub fn with_snapshot(source: Arc<dyn RegistrySource>, registry: Registry) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Arc::new(registry)),
            reload_lock: Mutex::new(()),
        }
    }

    /// Fetch and parse the registry without touching the current snapshot.
    pub async fn load(&self) -> Result<Registry> {
        let text = self.source.fetch_csv().await?;
        Registry::parse_csv(&text)
    }

    /// Load a fresh registry and swap it in. Returns the new record count.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn reload(&self) -> Result<usize> {
        let _writer = self.reload_lock.lock().await;

        let registry = self.load().await?;
        let count = registry.len();

        *self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(registry);

        tracing::info!(
            "registry loaded: {count} objects from {}",
            self.source.describe()
        );
        Ok(count)
    }

    /// Current snapshot, for callers needing several consistent lookups.
    pub fn snapshot(&self) -> Arc<Registry> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<ObjectRecord> {
        self.snapshot().get(name).cloned()
    }

    pub fn list(&self) -> Vec<ObjectRecord> {
        self.snapshot().records().to_vec()
    }
}
