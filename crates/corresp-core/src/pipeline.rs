use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::{
    classify::classify,
    config::Config,
    domain::{
        ErrorEntry, ExtractedDocument, FileAnalysis, FulltextEntry, FulltextPage, ObjectRecord,
        RemoteFileMeta,
    },
    errors::{Error, NotFound},
    extract::{is_supported, truncate_chars, BuiltinExtractor, DocumentFormat},
    ports::{StorageClient, TextExtractor},
    registry::RegistryStore,
    Result,
};

/// Pipeline Orchestrator.
///
/// Composes registry lookup, remote listing/download, text extraction and
/// classification. Holds no per-call state; the registry snapshot is the only
/// shared state and is owned by the [`RegistryStore`].
pub struct Pipeline {
    cfg: Arc<Config>,
    registry: Arc<RegistryStore>,
    storage: Arc<dyn StorageClient>,
    extractor: Arc<dyn TextExtractor>,
}

impl Pipeline {
    pub fn new(
        cfg: Arc<Config>,
        registry: Arc<RegistryStore>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            cfg,
            registry,
            storage,
            extractor: Arc::new(BuiltinExtractor),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn registry(&self) -> &Arc<RegistryStore> {
        &self.registry
    }

    pub fn list_objects(&self) -> Vec<ObjectRecord> {
        self.registry.list()
    }

    pub async fn list_object_files(&self, object_name: &str) -> Result<Vec<RemoteFileMeta>> {
        let record = self.resolve(object_name)?;
        self.storage.list_files(&record.folder_locator).await
    }

    /// Extracted text of one file, truncated to `text_max_chars` characters.
    pub async fn get_file_text(&self, object_name: &str, file_name: &str) -> Result<String> {
        let text = self.full_text(object_name, file_name).await?;
        Ok(truncate_chars(&text, self.cfg.text_max_chars))
    }

    /// Extract an offset/limit window of the object's PDF/DOCX files.
    ///
    /// A failure on one file becomes an [`ErrorEntry`] in that file's slot.
    /// Entries keep listing order regardless of download concurrency.
    pub async fn get_object_fulltext(
        &self,
        object_name: &str,
        limit: usize,
        offset: usize,
    ) -> Result<FulltextPage> {
        let record = self.resolve(object_name)?;
        let supported: Vec<RemoteFileMeta> = self
            .storage
            .list_files(&record.folder_locator)
            .await?
            .into_iter()
            .filter(|f| is_supported(&f.name))
            .collect();

        let total = supported.len();
        let window: Vec<RemoteFileMeta> = supported.into_iter().skip(offset).take(limit).collect();

        tracing::info!(
            "fulltext {object_name}: {} of {total} documents (offset {offset})",
            window.len()
        );

        let locator = record.folder_locator.as_str();
        let files: Vec<FulltextEntry> = stream::iter(window)
            .map(|meta| self.fulltext_entry(locator, meta))
            .buffered(self.cfg.fulltext_concurrency.max(1))
            .collect()
            .await;

        Ok(FulltextPage {
            total,
            offset,
            limit,
            files,
        })
    }

    /// Classify one file and return a short preview of its text.
    pub async fn analyze_file(&self, object_name: &str, file_name: &str) -> Result<FileAnalysis> {
        let text = self.full_text(object_name, file_name).await?;
        Ok(FileAnalysis {
            file_name: file_name.to_string(),
            classification: classify(&text),
            preview: truncate_chars(&text, self.cfg.preview_chars),
        })
    }

    fn resolve(&self, object_name: &str) -> Result<ObjectRecord> {
        self.registry
            .get(object_name)
            .ok_or_else(|| NotFound::Object(object_name.to_string()).into())
    }

    /// Object -> format check -> listing -> exact name match -> download -> extract.
    async fn full_text(&self, object_name: &str, file_name: &str) -> Result<String> {
        let record = self.resolve(object_name)?;
        let format = DocumentFormat::require(file_name)?;

        let meta = self
            .storage
            .list_files(&record.folder_locator)
            .await?
            .into_iter()
            .find(|f| f.name == file_name)
            .ok_or_else(|| NotFound::File {
                object: object_name.to_string(),
                file: file_name.to_string(),
            })?;

        self.fetch_text(&record.folder_locator, &meta, format).await
    }

    async fn fulltext_entry(&self, locator: &str, meta: RemoteFileMeta) -> FulltextEntry {
        let result = match DocumentFormat::require(&meta.name) {
            Ok(format) => self.fetch_text(locator, &meta, format).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => FulltextEntry::Document(ExtractedDocument {
                file_name: meta.name,
                modified: meta.modified,
                text,
            }),
            Err(e) => {
                tracing::warn!("fulltext: {} failed: {e}", meta.name);
                FulltextEntry::Error(ErrorEntry {
                    file_name: meta.name,
                    error: e.to_string(),
                    kind: e.kind().to_string(),
                })
            }
        }
    }

    async fn fetch_text(
        &self,
        locator: &str,
        meta: &RemoteFileMeta,
        format: DocumentFormat,
    ) -> Result<String> {
        let bytes = self.storage.download_file(locator, &meta.path).await?;
        tracing::debug!("downloaded {} ({} bytes)", meta.name, bytes.len());

        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract_text(format, &bytes))
            .await
            .map_err(|e| Error::External(format!("extraction task failed: {e}")))
    }
}
