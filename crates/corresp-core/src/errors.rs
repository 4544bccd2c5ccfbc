/// Failures loading the object registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry fetch failed: {0}")]
    FetchFailed(String),

    #[error("registry csv is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Failures talking to the remote storage provider.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage provider rejected the credential")]
    Unauthorized,

    #[error("storage resource not found")]
    NotFound,

    #[error("storage provider returned no download link")]
    NoDownloadLink,

    #[error("storage transport error: {0}")]
    Transport(String),
}

/// Lookup misses at the pipeline level.
#[derive(Debug, thiserror::Error)]
pub enum NotFound {
    #[error("object not found: {0}")]
    Object(String),

    #[error("file not found: {file} (object {object})")]
    File { object: String, file: String },
}

/// Core error type.
///
/// Adapter crates map their specific errors into this type so callers can
/// report failures consistently, keyed by [`Error::kind`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("unsupported format: {file_name}")]
    UnsupportedFormat { file_name: String },

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Stable machine-readable error kind for wrapping layers.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Registry(RegistryError::FetchFailed(_)) => "registry_fetch_failed",
            Error::Registry(RegistryError::MissingColumns(_)) => "registry_missing_columns",
            Error::Storage(StorageError::Unauthorized) => "storage_unauthorized",
            Error::Storage(StorageError::NotFound) => "storage_not_found",
            Error::Storage(StorageError::NoDownloadLink) => "storage_no_download_link",
            Error::Storage(StorageError::Transport(_)) => "storage_transport",
            Error::UnsupportedFormat { .. } => "unsupported_format",
            Error::NotFound(_) => "not_found",
            Error::Json(_) => "json",
            Error::External(_) => "external",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
