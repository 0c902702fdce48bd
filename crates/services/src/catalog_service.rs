use std::collections::HashMap;

use tracing::{debug, info};

use bee_core::catalog::Catalog;
use bee_core::model::{Tier, WordEnrichment};
use storage::repository::WordRepository;

use crate::enrichment::EnrichmentSource;
use crate::error::PopulateError;

/// Counts from one populate run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub inserted: u32,
    pub enriched: u32,
    /// True when the store already held words and nothing was inserted.
    pub skipped: bool,
}

/// Load every catalog word into an empty store.
///
/// Alternates take the dictionary data of their primary. All lookups run
/// before anything is written and the words go in as one batch, so a failed
/// run leaves the store empty and the next run starts over. A store that
/// already holds words is left untouched.
///
/// # Errors
///
/// Returns `PopulateError` on storage failures or enrichment I/O failures.
pub async fn populate(
    words: &dyn WordRepository,
    catalog: &Catalog,
    source: &dyn EnrichmentSource,
) -> Result<PopulateReport, PopulateError> {
    let existing = words.count_words().await?;
    if existing > 0 {
        debug!(existing, "word store already populated");
        return Ok(PopulateReport {
            skipped: true,
            ..PopulateReport::default()
        });
    }

    let mut report = PopulateReport::default();
    let mut batch = Vec::new();
    for tier in Tier::ALL {
        let mut looked_up: HashMap<String, Option<WordEnrichment>> = HashMap::new();
        for word in catalog.flatten(tier) {
            let key = word.role.primary_word().unwrap_or(word.spelling.as_str()).to_owned();
            let data = match looked_up.get(&key) {
                Some(data) => data.clone(),
                None => {
                    let data = source.lookup(&key).await?;
                    looked_up.insert(key, data.clone());
                    data
                }
            };
            batch.push(match data {
                Some(data) => {
                    report.enriched += 1;
                    word.with_enrichment(&data)
                }
                None => word,
            });
        }
        debug!(tier = %tier, primaries = catalog.entries(tier).len(), "prepared tier");
    }

    let ids = words.insert_words(batch).await?;
    report.inserted = u32::try_from(ids.len()).unwrap_or(u32::MAX);

    info!(
        inserted = report.inserted,
        enriched = report.enriched,
        "catalog populated"
    );
    Ok(report)
}

/// Apply dictionary data from `source` to words already in the store.
///
/// Each primary found in `source` updates the stored primary and its
/// alternates. Returns the number of stored words updated.
///
/// # Errors
///
/// Returns `PopulateError` on storage failures or enrichment I/O failures.
pub async fn refresh_enrichment(
    words: &dyn WordRepository,
    catalog: &Catalog,
    source: &dyn EnrichmentSource,
) -> Result<u32, PopulateError> {
    let mut updated = 0;
    for tier in Tier::ALL {
        let stored: HashMap<String, _> = words
            .primary_words(tier)
            .await?
            .into_iter()
            .map(|w| (w.spelling, w.id))
            .collect();

        for entry in catalog.entries(tier) {
            let Some(&primary_id) = stored.get(&entry.primary) else {
                continue;
            };
            let Some(data) = source.lookup(&entry.primary).await? else {
                continue;
            };

            words.update_enrichment(primary_id, &data).await?;
            updated += 1;
            for alternate in words.alternates_of(tier, &entry.primary).await? {
                words.update_enrichment(alternate.id, &data).await?;
                updated += 1;
            }
        }
    }

    info!(updated, "stored words refreshed from dictionary cache");
    Ok(updated)
}
