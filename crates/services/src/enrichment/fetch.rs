use std::path::Path;

use reqwest::Client;
use tracing::{info, warn};

use bee_core::catalog::Catalog;
use bee_core::model::{Tier, local_audio_path};

use super::merriam_webster::DictionaryClient;
use super::source::{DirectorySource, EnrichmentSource};
use crate::error::EnrichmentError;

/// Files at or below this size are treated as failed downloads and fetched again.
const MIN_AUDIO_BYTES: u64 = 1024;

/// Outcome counts of a dictionary fetch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub fetched: u32,
    pub cached: u32,
    pub failed: u32,
    pub with_audio: u32,
    pub alternates_skipped: u32,
}

/// Outcome counts of an audio download run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioReport {
    pub downloaded: u32,
    pub already_present: u32,
    pub no_audio: u32,
    pub failed: u32,
}

/// Fetch dictionary data for every primary spelling missing from `cache`.
///
/// Failures for single words are logged and counted, never fatal.
///
/// # Errors
///
/// Returns `EnrichmentError` only when reading an existing cache file fails.
pub async fn fetch_missing(
    catalog: &Catalog,
    cache: &DirectorySource,
    client: &dyn DictionaryClient,
) -> Result<FetchReport, EnrichmentError> {
    let mut report = FetchReport::default();

    for tier in Tier::ALL {
        for entry in catalog.entries(tier) {
            report.alternates_skipped += u32::try_from(entry.alternates.len()).unwrap_or(u32::MAX);
            let word = entry.primary.as_str();

            if cache.contains(word).await {
                report.cached += 1;
                if cache.lookup(word).await?.is_some_and(|d| d.has_audio) {
                    report.with_audio += 1;
                }
                continue;
            }

            match client.fetch(word).await {
                Ok(Some(data)) => match cache.store(word, &data).await {
                    Ok(()) => {
                        report.fetched += 1;
                        if data.has_audio {
                            report.with_audio += 1;
                        }
                    }
                    Err(e) => {
                        warn!(word, error = %e, "could not write cache file");
                        report.failed += 1;
                    }
                },
                Ok(None) => {
                    warn!(word, "no dictionary entry");
                    report.failed += 1;
                }
                Err(e) => {
                    warn!(word, error = %e, "dictionary fetch failed");
                    report.failed += 1;
                }
            }
        }
    }

    info!(
        fetched = report.fetched,
        cached = report.cached,
        failed = report.failed,
        with_audio = report.with_audio,
        alternates_skipped = report.alternates_skipped,
        "dictionary fetch finished"
    );
    Ok(report)
}

/// Download pronunciation audio for cached primaries into `<audio_root>/<tier slug>/<word>.mp3`.
///
/// # Errors
///
/// Returns `EnrichmentError` if the HTTP client cannot be built or the cache
/// cannot be read.
pub async fn download_audio(
    catalog: &Catalog,
    cache: &DirectorySource,
    audio_root: &Path,
) -> Result<AudioReport, EnrichmentError> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    let mut report = AudioReport::default();

    for tier in Tier::ALL {
        for entry in catalog.entries(tier) {
            let word = entry.primary.as_str();
            let Some(url) = cache
                .lookup(word)
                .await?
                .and_then(|d| d.audio_url)
                .filter(|u| !u.is_empty())
            else {
                report.no_audio += 1;
                continue;
            };

            let relative = local_audio_path(tier, word);
            let target = audio_root.join(relative.trim_start_matches("audio/"));
            let existing = tokio::fs::metadata(&target).await.map(|m| m.len()).unwrap_or(0);
            if existing > MIN_AUDIO_BYTES {
                report.already_present += 1;
                continue;
            }

            match download_one(&client, &url, &target).await {
                Ok(()) => report.downloaded += 1,
                Err(e) => {
                    warn!(word, url = %url, error = %e, "audio download failed");
                    report.failed += 1;
                }
            }
        }
    }

    info!(
        downloaded = report.downloaded,
        already_present = report.already_present,
        no_audio = report.no_audio,
        failed = report.failed,
        "audio download finished"
    );
    Ok(report)
}

async fn download_one(client: &Client, url: &str, target: &Path) -> Result<(), EnrichmentError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(EnrichmentError::HttpStatus(response.status()));
    }
    let bytes = response.bytes().await?;
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(target, &bytes).await?;
    Ok(())
}
