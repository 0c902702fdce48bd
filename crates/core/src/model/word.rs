use serde::{Deserialize, Serialize};

use crate::model::{ids::WordId, tier::Tier};

//
// ─── ROLE ──────────────────────────────────────────────────────────────────────
//

/// Whether a catalog entry is the canonical spelling or an accepted variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WordRole {
    Primary,
    /// Accepted variant of `primary`; shares the primary's progress record.
    Alternate { primary: String },
}

impl WordRole {
    #[must_use]
    pub fn is_primary(&self) -> bool {
        matches!(self, WordRole::Primary)
    }

    /// Spelling of the primary this entry belongs to, if it is an alternate.
    #[must_use]
    pub fn primary_word(&self) -> Option<&str> {
        match self {
            WordRole::Primary => None,
            WordRole::Alternate { primary } => Some(primary.as_str()),
        }
    }
}

//
// ─── ENRICHMENT ────────────────────────────────────────────────────────────────
//

/// Dictionary data attached to a primary spelling.
///
/// Every field defaults when absent so partially filled cache files still
/// load. Unknown keys (raw API payloads, bookkeeping) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordEnrichment {
    pub word: String,
    pub shortdef: Vec<String>,
    pub functional_label: Option<String>,
    pub pronunciation: Option<String>,
    pub has_audio: bool,
    pub audio_file: Option<String>,
    pub audio_url: Option<String>,
    pub is_inflection: bool,
    pub base_word: Option<String>,
}

impl WordEnrichment {
    /// Human-readable definition: inflection note first, then short definitions.
    ///
    /// ```
    /// # use bee_core::model::WordEnrichment;
    /// let data = WordEnrichment {
    ///     shortdef: vec!["to hold fast".into()],
    ///     functional_label: Some("past tense".into()),
    ///     is_inflection: true,
    ///     base_word: Some("stick".into()),
    ///     ..WordEnrichment::default()
    /// };
    /// assert_eq!(data.definition_text(), "(past tense of stick) • to hold fast");
    /// ```
    #[must_use]
    pub fn definition_text(&self) -> String {
        let mut parts = Vec::with_capacity(self.shortdef.len() + 1);

        if self.is_inflection {
            if let Some(base) = self.base_word.as_deref().filter(|b| !b.is_empty()) {
                let label = self
                    .functional_label
                    .as_deref()
                    .filter(|l| !l.is_empty())
                    .unwrap_or("form");
                parts.push(format!("({label} of {base})"));
            }
        }

        parts.extend(self.shortdef.iter().cloned());
        parts.join(" • ")
    }
}

//
// ─── WORD ENTRY ────────────────────────────────────────────────────────────────
//

/// A word ready to be inserted into the store; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWord {
    pub spelling: String,
    pub tier: Tier,
    pub role: WordRole,
    pub definition: String,
    pub functional_label: String,
    pub pronunciation: String,
    pub has_audio: bool,
    pub audio_url: String,
    pub audio_file_local: String,
    pub is_inflection: bool,
    pub base_word: String,
}

impl NewWord {
    /// Bare entry with empty enrichment fields and the conventional local audio path.
    #[must_use]
    pub fn new(spelling: impl Into<String>, tier: Tier, role: WordRole) -> Self {
        let spelling = spelling.into();
        let audio_file_local = local_audio_path(tier, &spelling);
        Self {
            spelling,
            tier,
            role,
            definition: String::new(),
            functional_label: String::new(),
            pronunciation: String::new(),
            has_audio: false,
            audio_url: String::new(),
            audio_file_local,
            is_inflection: false,
            base_word: String::new(),
        }
    }

    /// Copy dictionary data onto this entry.
    #[must_use]
    pub fn with_enrichment(mut self, data: &WordEnrichment) -> Self {
        self.definition = data.definition_text();
        self.functional_label = data.functional_label.clone().unwrap_or_default();
        self.pronunciation = data.pronunciation.clone().unwrap_or_default();
        self.has_audio = data.has_audio;
        self.audio_url = data.audio_url.clone().unwrap_or_default();
        self.is_inflection = data.is_inflection;
        self.base_word = data.base_word.clone().unwrap_or_default();
        self
    }

    #[must_use]
    pub fn assign_id(self, id: WordId) -> WordEntry {
        WordEntry {
            id,
            spelling: self.spelling,
            tier: self.tier,
            role: self.role,
            definition: self.definition,
            functional_label: self.functional_label,
            pronunciation: self.pronunciation,
            has_audio: self.has_audio,
            audio_url: self.audio_url,
            audio_file_local: self.audio_file_local,
            is_inflection: self.is_inflection,
            base_word: self.base_word,
        }
    }
}

/// Persisted catalog word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub id: WordId,
    pub spelling: String,
    pub tier: Tier,
    pub role: WordRole,
    pub definition: String,
    pub functional_label: String,
    pub pronunciation: String,
    pub has_audio: bool,
    pub audio_url: String,
    pub audio_file_local: String,
    pub is_inflection: bool,
    pub base_word: String,
}

impl WordEntry {
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.role.is_primary()
    }

    #[must_use]
    pub fn primary_word(&self) -> Option<&str> {
        self.role.primary_word()
    }
}

/// `audio/<tier slug>/<spelling>.mp3`
#[must_use]
pub fn local_audio_path(tier: Tier, spelling: &str) -> String {
    format!("audio/{}/{spelling}.mp3", tier.slug())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
