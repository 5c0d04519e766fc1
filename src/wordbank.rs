//! Embedded word bank, used as an offline [`WordSupplier`].
//!
//! Each line of the bank is `difficulty|category|word|hint`. Blank lines and
//! lines starting with `#` are skipped.

use std::collections::HashSet;

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::config::Difficulty;
use crate::error::SupplierError;
use crate::supplier::{FetchRequest, WordSupplier, finish_batch};
use crate::word::{WordEntry, sanitize_word};
use crate::debug_log;

pub const EMBEDDED_WORDBANK: &str = include_str!("resources/words.txt");

#[derive(Debug, Clone, PartialEq, Eq)]
struct BankEntry {
    difficulty: Difficulty,
    entry: WordEntry,
}

/// Offline word supplier backed by a static list.
#[derive(Debug, Clone)]
pub struct WordBank {
    entries: Vec<BankEntry>,
}

impl WordBank {
    pub fn embedded() -> Self {
        Self::parse(EMBEDDED_WORDBANK)
    }

    /// Parses bank lines; malformed lines are skipped.
    pub fn parse(data: &str) -> Self {
        let entries = data
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(parse_line)
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks up to `request.count` entries, easiest first.
    fn pick(&self, request: &FetchRequest) -> Vec<WordEntry> {
        let excluded: HashSet<String> = request
            .exclude_words
            .iter()
            .map(|w| w.to_uppercase())
            .collect();

        let mut pool: Vec<&BankEntry> = self
            .entries
            .iter()
            .filter(|b| b.difficulty == request.difficulty)
            .filter(|b| request.rich_mode || !b.entry.word.contains(' '))
            .filter(|b| !excluded.contains(&b.entry.word.to_uppercase()))
            .collect();

        // Prefer categories named by the instructions; ignore them if nothing matches.
        let keywords = instruction_keywords(&request.instructions);
        let themed: Vec<&BankEntry> = pool
            .iter()
            .copied()
            .filter(|b| matches_keywords(&b.entry, &keywords))
            .collect();
        if !themed.is_empty() {
            pool = themed;
        }
        debug_log!(
            "WordBank::pick() - {} candidates for {} ({} excluded)",
            pool.len(),
            request.difficulty,
            excluded.len()
        );

        pool.shuffle(&mut rand::thread_rng());
        let mut picked: Vec<WordEntry> = pool
            .into_iter()
            .take(request.count)
            .map(|b| b.entry.clone())
            .collect();
        picked.sort_by_key(|e| e.word.chars().filter(|c| *c != ' ').count());
        picked
    }
}

#[async_trait]
impl WordSupplier for WordBank {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<WordEntry>, SupplierError> {
        finish_batch(self.pick(request), request.count)
    }
}

fn parse_line(line: &str) -> Option<BankEntry> {
    let mut fields = line.splitn(4, '|').map(str::trim);
    let difficulty = match fields.next()? {
        "easy" => Difficulty::Easy,
        "medium" => Difficulty::Medium,
        "hard" => Difficulty::Hard,
        _ => return None,
    };
    let category = fields.next()?;
    let word = sanitize_word(fields.next()?);
    let hint = fields.next()?;
    if word.is_empty() || category.is_empty() {
        return None;
    }
    Some(BankEntry {
        difficulty,
        entry: WordEntry::new(category, &word, hint),
    })
}

fn instruction_keywords(instructions: &str) -> Vec<String> {
    instructions
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(str::to_lowercase)
        .collect()
}

fn matches_keywords(entry: &WordEntry, keywords: &[String]) -> bool {
    let category = entry.category.to_lowercase();
    keywords
        .iter()
        .any(|k| category.contains(k.as_str()) || k.contains(category.as_str()))
}
