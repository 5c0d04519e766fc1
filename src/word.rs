use serde::{Deserialize, Serialize};

/// Character shown for a letter that has not been revealed yet.
pub const PLACEHOLDER: char = '_';

/// On-screen keyboard layout; also the set of guessable keys.
pub const KEYBOARD_ROWS: [&str; 4] = ["1234567890", "QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// A single secret word together with its category and hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub category: String,
    pub word: String,
    pub hint: String,
}

impl WordEntry {
    pub fn new(category: &str, word: &str, hint: &str) -> Self {
        Self {
            category: category.to_string(),
            word: word.to_string(),
            hint: hint.to_string(),
        }
    }

    /// Returns the entry with its word sanitized, or `None` if nothing usable remains.
    #[must_use]
    pub fn sanitized(mut self) -> Option<Self> {
        self.word = sanitize_word(&self.word);
        if self.word.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Keeps letters, digits and single spaces; trims the ends.
pub fn sanitize_word(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-cases a key press and checks it against the keyboard.
pub fn normalize_key(key: char) -> Option<char> {
    let upper = key.to_ascii_uppercase();
    upper.is_ascii_alphanumeric().then_some(upper)
}

/// Builds the initial reveal for a word: spaces shown, everything else hidden.
pub fn initial_reveal(word: &str) -> Vec<char> {
    word.chars()
        .map(|c| if c == ' ' { ' ' } else { PLACEHOLDER })
        .collect()
}
