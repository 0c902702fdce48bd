use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use bee_core::model::WordEnrichment;

use crate::error::EnrichmentError;

/// Where populate looks up dictionary data for a primary spelling.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    /// Data for `spelling`, or `None` when nothing usable is known.
    ///
    /// # Errors
    ///
    /// Returns `EnrichmentError` for failures other than missing or malformed data.
    async fn lookup(&self, spelling: &str) -> Result<Option<WordEnrichment>, EnrichmentError>;
}

/// Source that knows nothing; every word loads with empty dictionary fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

#[async_trait]
impl EnrichmentSource for NoEnrichment {
    async fn lookup(&self, _spelling: &str) -> Result<Option<WordEnrichment>, EnrichmentError> {
        Ok(None)
    }
}

/// Cache directory holding one `<word>.json` file per primary spelling.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, spelling: &str) -> PathBuf {
        self.dir.join(format!("{spelling}.json"))
    }

    /// Whether a cache file exists for `spelling`.
    pub async fn contains(&self, spelling: &str) -> bool {
        tokio::fs::try_exists(self.path_for(spelling))
            .await
            .unwrap_or(false)
    }

    /// Write `data` as the cache file for `spelling`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `EnrichmentError::Io` or `EnrichmentError::Json` when the file cannot be written.
    pub async fn store(&self, spelling: &str, data: &WordEnrichment) -> Result<(), EnrichmentError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_vec_pretty(data)?;
        tokio::fs::write(self.path_for(spelling), body).await?;
        Ok(())
    }
}

#[async_trait]
impl EnrichmentSource for DirectorySource {
    async fn lookup(&self, spelling: &str) -> Result<Option<WordEnrichment>, EnrichmentError> {
        let path = self.path_for(spelling);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<WordEnrichment>(&bytes) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed enrichment file");
                Ok(None)
            }
        }
    }
}
