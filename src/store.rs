//! Key-value persistence for the used-words log and the instruction book.
//!
//! Every value is a JSON document stored under a fixed key. Read and write
//! failures never reach the player: callers fall back to empty defaults and
//! log a warning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::StoreError;
use crate::info_log;

pub const USED_WORDS_KEY: &str = "usedWords";
pub const INSTRUCTIONS_KEY: &str = "instructions";
pub const HISTORY_KEY: &str = "history";
pub const FAVORITES_KEY: &str = "favorites";

pub const DEFAULT_USED_WORDS_CAP: usize = 200;
pub const HISTORY_CAP: usize = 10;

/// JSON key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory store, used by tests and `--no-save` runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store under the platform data directory, e.g. `~/.local/share/hangman`.
    pub fn in_default_location() -> Result<Self, StoreError> {
        Self::new(default_data_dir().ok_or(StoreError::NoDataDir)?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("hangman"))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Reads a list of strings, treating absence and any failure as empty.
fn load_strings<S: KeyValueStore>(store: &S, key: &str) -> Vec<String> {
    let value = match store.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("Failed to read '{key}', starting empty: {e}");
            return Vec::new();
        }
    };
    serde_json::from_value(value).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed '{key}': {e}");
        Vec::new()
    })
}

fn save_strings<S: KeyValueStore>(store: &mut S, key: &str, values: &[String]) {
    if let Err(e) = store.set(key, Value::from(values.to_vec())) {
        log::warn!("Failed to persist '{key}': {e}");
    }
}

/// Front-inserted log of words the player has solved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedWordsLog {
    words: Vec<String>,
    cap: usize,
}

impl UsedWordsLog {
    pub fn load<S: KeyValueStore>(store: &S, cap: usize) -> Self {
        let mut words = load_strings(store, USED_WORDS_KEY);
        words.truncate(cap);
        info_log!("Loaded {} used words", words.len());
        Self { words, cap }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Records a solved word and flushes the log.
    pub fn record<S: KeyValueStore>(&mut self, store: &mut S, word: &str) {
        self.words.insert(0, word.to_string());
        self.words.truncate(self.cap);
        save_strings(store, USED_WORDS_KEY, &self.words);
    }
}

/// Instruction text history and favorites that steer the supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionBook {
    pub last_input: String,
    pub history: Vec<String>,
    pub favorites: Vec<String>,
}

impl InstructionBook {
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let last_input = match store.get(INSTRUCTIONS_KEY) {
            Ok(Some(Value::String(text))) => text,
            Ok(_) => String::new(),
            Err(e) => {
                log::warn!("Failed to read '{INSTRUCTIONS_KEY}': {e}");
                String::new()
            }
        };
        Self {
            last_input,
            history: load_strings(store, HISTORY_KEY),
            favorites: load_strings(store, FAVORITES_KEY),
        }
    }

    /// Remembers `text` as the latest input and moves it to the front of the history.
    pub fn remember<S: KeyValueStore>(&mut self, store: &mut S, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.last_input = text.to_string();
        self.history.retain(|h| h != text);
        self.history.insert(0, text.to_string());
        self.history.truncate(HISTORY_CAP);

        if let Err(e) = store.set(INSTRUCTIONS_KEY, Value::from(text)) {
            log::warn!("Failed to persist '{INSTRUCTIONS_KEY}': {e}");
        }
        save_strings(store, HISTORY_KEY, &self.history);
    }

    /// Adds `text` to the favorites, or removes it if already there.
    ///
    /// Returns whether it is a favorite afterwards.
    pub fn toggle_favorite<S: KeyValueStore>(&mut self, store: &mut S, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let now_favorite = if self.favorites.iter().any(|f| f == text) {
            self.favorites.retain(|f| f != text);
            false
        } else {
            self.favorites.insert(0, text.to_string());
            true
        };
        save_strings(store, FAVORITES_KEY, &self.favorites);
        now_favorite
    }
}
