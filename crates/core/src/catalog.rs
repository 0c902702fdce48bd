//! Static word lists partitioned into tiers.
//!
//! A catalog file is a JSON object keyed by tier (`"one_bee"` or `"1"`), each
//! holding an ordered list whose items are either a spelling or an array of
//! `[primary, alternate, ...]`.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{NewWord, Tier, TierError, WordRole};

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(String),
    #[error(transparent)]
    Tier(#[from] TierError),
    #[error("tier {tier} has an item with no spellings")]
    EmptyItem { tier: Tier },
    #[error("tier {tier} has a blank spelling")]
    BlankSpelling { tier: Tier },
    #[error("tier {tier}: alternate {spelling:?} repeats its primary")]
    AlternateRepeatsPrimary { tier: Tier, spelling: String },
    #[error("tier {tier} is listed more than once")]
    DuplicateTier { tier: Tier },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItem {
    Single(String),
    Group(Vec<String>),
}

/// A primary spelling with its accepted variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub primary: String,
    pub alternates: Vec<String>,
}

impl CatalogEntry {
    /// This entry as storable words: the primary followed by its alternates.
    #[must_use]
    pub fn words(&self, tier: Tier) -> Vec<NewWord> {
        let mut words = Vec::with_capacity(self.alternates.len() + 1);
        words.push(NewWord::new(self.primary.clone(), tier, WordRole::Primary));
        for alt in &self.alternates {
            words.push(NewWord::new(
                alt.clone(),
                tier,
                WordRole::Alternate {
                    primary: self.primary.clone(),
                },
            ));
        }
        words
    }

    fn from_raw(tier: Tier, raw: RawItem) -> Result<Self, CatalogError> {
        let mut spellings = match raw {
            RawItem::Single(s) => vec![s],
            RawItem::Group(group) => group,
        }
        .into_iter()
        .map(|s| s.trim().to_owned());

        let primary = spellings.next().ok_or(CatalogError::EmptyItem { tier })?;
        if primary.is_empty() {
            return Err(CatalogError::BlankSpelling { tier });
        }

        let mut alternates = Vec::new();
        for spelling in spellings {
            if spelling.is_empty() {
                return Err(CatalogError::BlankSpelling { tier });
            }
            if spelling == primary {
                return Err(CatalogError::AlternateRepeatsPrimary { tier, spelling });
            }
            alternates.push(spelling);
        }

        Ok(Self {
            primary,
            alternates,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tiers: BTreeMap<Tier, Vec<CatalogEntry>>,
}

impl Catalog {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for malformed JSON, unknown or repeated tier keys
    /// (`"one_bee"` and `"1"` name the same tier), blank spellings, or
    /// alternates equal to their primary.
    pub fn from_json(source: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<RawItem>> =
            serde_json::from_str(source).map_err(|e| CatalogError::Json(e.to_string()))?;

        let mut tiers = BTreeMap::new();
        for (key, items) in raw {
            let tier: Tier = key.parse()?;
            let entries = items
                .into_iter()
                .map(|item| CatalogEntry::from_raw(tier, item))
                .collect::<Result<Vec<_>, _>>()?;
            if tiers.insert(tier, entries).is_some() {
                return Err(CatalogError::DuplicateTier { tier });
            }
        }

        Ok(Self { tiers })
    }

    /// The word lists shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` only if the bundled file is malformed.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    #[must_use]
    pub fn entries(&self, tier: Tier) -> &[CatalogEntry] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every entry of `tier` as storable words: each primary followed by its alternates.
    #[must_use]
    pub fn flatten(&self, tier: Tier) -> Vec<NewWord> {
        self.entries(tier)
            .iter()
            .flat_map(|entry| entry.words(tier))
            .collect()
    }
}
