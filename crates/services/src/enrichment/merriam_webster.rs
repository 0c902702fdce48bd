use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use bee_core::model::WordEnrichment;

use crate::error::EnrichmentError;

const DEFAULT_BASE_URL: &str = "https://dictionaryapi.com/api/v3/references";
const AUDIO_BASE_URL: &str = "https://media.merriam-webster.com/audio/prons/en/us/mp3";
const ELEMENTARY_REF: &str = "sd2";
const SCHOOL_REF: &str = "sd4";

/// Anything that can fetch dictionary data for one word.
#[async_trait]
pub trait DictionaryClient: Send + Sync {
    /// Data for `word`, or `None` if the dictionary only offered suggestions.
    ///
    /// # Errors
    ///
    /// Returns `EnrichmentError` if every configured dictionary failed.
    async fn fetch(&self, word: &str) -> Result<Option<WordEnrichment>, EnrichmentError>;
}

#[derive(Clone, Debug)]
pub struct DictionaryConfig {
    pub base_url: String,
    pub elementary_key: Option<String>,
    pub school_key: Option<String>,
}

impl DictionaryConfig {
    /// Read `MW_API_KEY_ELEMENTARY` and `MW_API_KEY_SCHOOL`; `None` when neither is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let key = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        let elementary_key = key("MW_API_KEY_ELEMENTARY");
        let school_key = key("MW_API_KEY_SCHOOL");
        if elementary_key.is_none() && school_key.is_none() {
            return None;
        }
        Some(Self {
            base_url: DEFAULT_BASE_URL.into(),
            elementary_key,
            school_key,
        })
    }
}

/// Elementary dictionary first, school dictionary when that only returns suggestions.
#[derive(Clone)]
pub struct MerriamWebsterClient {
    client: Client,
    config: DictionaryConfig,
}

impl MerriamWebsterClient {
    /// # Errors
    ///
    /// Returns `EnrichmentError::Http` if the HTTP client cannot be built.
    pub fn new(config: DictionaryConfig) -> Result<Self, EnrichmentError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, reference: &str, word: &str, key: &str) -> String {
        format!(
            "{}/{reference}/json/{word}?key={key}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn lookup_in(
        &self,
        reference: &str,
        word: &str,
        key: &str,
    ) -> Result<Option<WordEnrichment>, EnrichmentError> {
        let body = get_with_retry(&self.client, &self.url(reference, word, key)).await?;
        parse_entry(word, &body)
    }
}

#[async_trait]
impl DictionaryClient for MerriamWebsterClient {
    async fn fetch(&self, word: &str) -> Result<Option<WordEnrichment>, EnrichmentError> {
        if let Some(key) = self.config.elementary_key.as_deref() {
            if let Some(data) = self.lookup_in(ELEMENTARY_REF, word, key).await? {
                return Ok(Some(data));
            }
            debug!(word, "elementary dictionary returned suggestions only");
        }

        if let Some(key) = self.config.school_key.as_deref() {
            return self.lookup_in(SCHOOL_REF, word, key).await;
        }
        Ok(None)
    }
}

/// GET `url` as text, retrying once when the request itself fails.
pub(crate) async fn get_with_retry(client: &Client, url: &str) -> Result<String, EnrichmentError> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "request failed, retrying once");
            client.get(url).send().await?
        }
    };

    if !response.status().is_success() {
        return Err(EnrichmentError::HttpStatus(response.status()));
    }
    Ok(response.text().await?)
}

/// Pull the drill-relevant fields out of a dictionary response body.
///
/// A body that is an empty list or a list of suggestion strings yields `None`.
///
/// # Errors
///
/// Returns `EnrichmentError::Json` if the body is not JSON at all.
pub fn parse_entry(word: &str, body: &str) -> Result<Option<WordEnrichment>, EnrichmentError> {
    let items: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let Some(first) = items.into_iter().next() else {
        return Ok(None);
    };
    if first.get("meta").is_none() {
        return Ok(None);
    }

    let entry: ApiEntry = serde_json::from_value(first).unwrap_or_default();
    let prs = entry.hwi.prs;

    let audio_file = prs
        .iter()
        .find_map(|pr| pr.sound.as_ref().and_then(|s| s.audio.clone()))
        .filter(|a| !a.is_empty());
    let pronunciation = prs
        .first()
        .and_then(|pr| pr.mw.clone())
        .filter(|mw| !mw.is_empty());

    let past_tense = entry.cxs.iter().find(|cx| {
        cx.cxl
            .as_deref()
            .is_some_and(|label| label.to_lowercase().contains("past tense"))
    });
    let base_word = past_tense
        .and_then(|cx| cx.cxtis.first())
        .and_then(|t| t.cxt.clone());

    Ok(Some(WordEnrichment {
        word: word.to_owned(),
        shortdef: entry.shortdef,
        functional_label: entry.fl,
        pronunciation,
        has_audio: audio_file.is_some(),
        audio_url: audio_file.as_deref().map(audio_url),
        audio_file,
        is_inflection: past_tense.is_some(),
        base_word,
    }))
}

/// Public URL of a pronunciation recording.
///
/// ```
/// # use services::enrichment::audio_url;
/// assert_eq!(
///     audio_url("bixcat01"),
///     "https://media.merriam-webster.com/audio/prons/en/us/mp3/bix/bixcat01.mp3"
/// );
/// assert!(audio_url("3d000001").contains("/number/"));
/// assert!(audio_url("cat00001").contains("/c/cat00001"));
/// ```
#[must_use]
pub fn audio_url(audio_file: &str) -> String {
    let subdir = if audio_file.starts_with("bix") {
        "bix"
    } else if audio_file.starts_with("gg") {
        "gg"
    } else {
        match audio_file.chars().next() {
            Some(c) if c.is_alphabetic() => &audio_file[..c.len_utf8()],
            _ => "number",
        }
    };
    format!("{AUDIO_BASE_URL}/{subdir}/{audio_file}.mp3")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiEntry {
    hwi: Headword,
    shortdef: Vec<String>,
    fl: Option<String>,
    cxs: Vec<CrossReference>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Headword {
    prs: Vec<Pronunciation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pronunciation {
    mw: Option<String>,
    sound: Option<Sound>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Sound {
    audio: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CrossReference {
    cxl: Option<String>,
    cxtis: Vec<CrossReferenceTarget>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CrossReferenceTarget {
    cxt: Option<String>,
}
