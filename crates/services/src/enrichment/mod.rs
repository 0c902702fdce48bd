//! Dictionary data for catalog words: cached lookups and the remote client.

mod fetch;
mod merriam_webster;
mod source;

pub use fetch::{AudioReport, FetchReport, download_audio, fetch_missing};
pub use merriam_webster::{
    DictionaryClient, DictionaryConfig, MerriamWebsterClient, audio_url, parse_entry,
};
pub use source::{DirectorySource, EnrichmentSource, NoEnrichment};
