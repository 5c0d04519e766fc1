//! The word supplier boundary.
//!
//! A supplier turns instructions, a difficulty and an exclusion list into a
//! batch of [`WordEntry`] values. Implementations:
//! - [`GeminiSupplier`]: remote generative-AI service
//! - [`crate::wordbank::WordBank`]: embedded offline word bank

pub mod gemini;

use async_trait::async_trait;

use crate::config::Difficulty;
use crate::error::SupplierError;
use crate::word::WordEntry;

pub use gemini::GeminiSupplier;

/// Everything a supplier needs to produce one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub instructions: String,
    pub difficulty: Difficulty,
    pub rich_mode: bool,
    pub exclude_words: Vec<String>,
    pub count: usize,
}

#[async_trait]
pub trait WordSupplier: Send + Sync {
    /// Fetch a batch of entries, ordered from easiest to hardest.
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<WordEntry>, SupplierError>;

    /// Produce a fresh, misleading-but-fair hint for `entry`.
    async fn tricky_hint(&self, entry: &WordEntry) -> Result<String, SupplierError> {
        Ok(entry.hint.clone())
    }
}

/// Hint used when the supplier cannot produce one.
pub fn fallback_hint(entry: &WordEntry) -> String {
    format!(
        "It has {} letters. Think about the topic of {}.",
        entry.word.chars().filter(|c| *c != ' ').count(),
        entry.category
    )
}

/// Sanitizes a raw batch, drops unusable entries and truncates to `count`.
///
/// An empty result is an error, never an empty-but-valid batch.
pub fn finish_batch(
    raw: Vec<WordEntry>,
    count: usize,
) -> Result<Vec<WordEntry>, SupplierError> {
    let batch: Vec<WordEntry> = raw
        .into_iter()
        .filter_map(WordEntry::sanitized)
        .take(count)
        .collect();
    if batch.is_empty() {
        return Err(SupplierError::EmptyBatch);
    }
    Ok(batch)
}
