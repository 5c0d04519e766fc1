//! The game session state machine.
//!
//! # State Machine
//! - `Waiting` → `Playing` via [`GameSession::activate_level`] once the batch
//!   holds a word for the current level
//! - `Playing` → `Won` / `Lost` via [`GameSession::guess`]
//! - `Won` / `Lost` → `Waiting` via [`GameSession::advance`]
//!
//! Batch arrivals only append words; they never touch reveal, lives or phase.
//! Every fetch is tagged with the session epoch, which [`GameSession::advance`]
//! bumps on a full reset so that late results of the previous run are dropped.

use std::collections::BTreeSet;

use crate::config::SessionConfig;
use crate::error::{SessionError, SupplierError};
use crate::figure;
use crate::prefetch::{BATCH_SIZE, build_exclusions, should_fetch};
use crate::supplier::FetchRequest;
use crate::word::{PLACEHOLDER, WordEntry, initial_reveal, normalize_key};
use crate::{debug_log, info_log};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No word is active yet; the batch has nothing for this level.
    Waiting,
    Playing,
    Won,
    Lost,
}

/// Result of an accepted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The key occurs `n` times in the word.
    Hit(usize),
    Miss,
    /// The key was tried before; nothing changed.
    Repeated,
}

/// Result of applying a supplier response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchArrival {
    /// Number of entries appended.
    Applied(usize),
    /// Response belonged to a previous epoch and was discarded.
    Stale,
}

/// Read-only snapshot of the session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: GamePhase,
    pub level: usize,
    pub streak: u32,
    pub category: String,
    pub hint: String,
    pub reveal: String,
    pub lives: u8,
    pub max_lives: u8,
    pub correct_keys: String,
    pub incorrect_keys: String,
    /// The secret word, only once the game is lost or won.
    pub answer: Option<String>,
    pub visible_parts: usize,
}

impl SessionView {
    pub fn is_disabled(&self, key: char) -> bool {
        self.correct_keys.contains(key) || self.incorrect_keys.contains(key)
    }
}

/// A single player's game session.
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    phase: GamePhase,
    level: usize,
    streak: u32,
    batch: Vec<WordEntry>,
    current: Option<WordEntry>,
    reveal: Vec<char>,
    lives: u8,
    correct_keys: BTreeSet<char>,
    incorrect_keys: BTreeSet<char>,
    epoch: u64,
    fetch_in_flight: bool,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        let lives = config.max_lives();
        Self {
            config,
            phase: GamePhase::Waiting,
            level: 1,
            streak: 0,
            batch: Vec::new(),
            current: None,
            reveal: Vec::new(),
            lives,
            correct_keys: BTreeSet::new(),
            incorrect_keys: BTreeSet::new(),
            epoch: 0,
            fetch_in_flight: false,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn max_lives(&self) -> u8 {
        self.config.max_lives()
    }

    pub fn batch(&self) -> &[WordEntry] {
        &self.batch
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn current_entry(&self) -> Option<&WordEntry> {
        self.current.as_ref()
    }

    pub fn reveal(&self) -> String {
        self.reveal.iter().collect()
    }

    pub fn correct_keys(&self) -> &BTreeSet<char> {
        &self.correct_keys
    }

    pub fn incorrect_keys(&self) -> &BTreeSet<char> {
        &self.incorrect_keys
    }

    /// The word to show as the answer once the round is over.
    pub fn answer(&self) -> Option<&str> {
        match self.phase {
            GamePhase::Won | GamePhase::Lost => self.current.as_ref().map(|e| e.word.as_str()),
            GamePhase::Waiting | GamePhase::Playing => None,
        }
    }

    /// Whether the batch already holds the word for the current level.
    pub fn level_ready(&self) -> bool {
        self.batch.len() >= self.level
    }

    /// Number of figure parts drawn for the current lives.
    pub fn visible_parts(&self) -> usize {
        figure::visible_parts(self.lives, self.config.max_lives())
    }

    /// Appends supplier entries; an empty slice leaves everything unchanged.
    pub fn load_batch(&mut self, entries: Vec<WordEntry>) {
        if entries.is_empty() {
            debug_log!("load_batch() - ignoring empty batch");
            return;
        }
        info_log!(
            "load_batch() - appending {} entries to batch of {}",
            entries.len(),
            self.batch.len()
        );
        self.batch.extend(entries);
    }

    /// Returns the next request when the prefetch policy fires and nothing is in flight.
    ///
    /// Marks the fetch as in flight; the outcome must be handed to
    /// [`GameSession::on_batch_arrived`].
    pub fn begin_fetch<'a>(
        &mut self,
        used_words: impl IntoIterator<Item = &'a str>,
    ) -> Option<FetchRequest> {
        if self.fetch_in_flight || !should_fetch(self.level, self.batch.len()) {
            return None;
        }
        let used: Vec<&str> = if self.config.cant_repeat_words {
            used_words.into_iter().collect()
        } else {
            Vec::new()
        };
        let exclude_words = build_exclusions(self.batch.iter().map(|e| e.word.as_str()), used);
        self.fetch_in_flight = true;
        info_log!(
            "begin_fetch() - level {} batch {} epoch {}",
            self.level,
            self.batch.len(),
            self.epoch
        );
        Some(FetchRequest {
            instructions: self.config.instructions.clone(),
            difficulty: self.config.difficulty(),
            rich_mode: self.config.rich_mode,
            exclude_words,
            count: BATCH_SIZE,
        })
    }

    /// Applies a supplier response requested under `epoch`.
    ///
    /// Responses from an older epoch are ignored. An error or an empty batch
    /// is returned as [`SessionError::Supplier`] and leaves the batch untouched.
    pub fn on_batch_arrived(
        &mut self,
        epoch: u64,
        result: Result<Vec<WordEntry>, SupplierError>,
    ) -> Result<BatchArrival, SessionError> {
        if epoch != self.epoch {
            info_log!(
                "on_batch_arrived() - discarding stale response (epoch {} != {})",
                epoch,
                self.epoch
            );
            return Ok(BatchArrival::Stale);
        }
        self.fetch_in_flight = false;

        let entries = result?;
        if entries.is_empty() {
            return Err(SupplierError::EmptyBatch.into());
        }
        let count = entries.len();
        self.load_batch(entries);
        Ok(BatchArrival::Applied(count))
    }

    /// Activates the word for the current level if the session is waiting for one.
    pub fn activate_level(&mut self) -> bool {
        if self.phase != GamePhase::Waiting || !self.level_ready() {
            return false;
        }
        let mut entry = self.batch[self.level - 1].clone();
        entry.word = entry.word.to_uppercase();

        self.reveal = initial_reveal(&entry.word);
        self.lives = self.config.max_lives();
        self.correct_keys.clear();
        self.incorrect_keys.clear();
        info_log!("activate_level() - level {} ({})", self.level, entry.category);
        self.current = Some(entry);
        self.phase = GamePhase::Playing;
        true
    }

    /// Applies one key press.
    ///
    /// All occurrences are revealed at once. A miss costs exactly one life.
    pub fn guess(&mut self, key: char) -> Result<GuessOutcome, SessionError> {
        if self.phase != GamePhase::Playing {
            return Err(SessionError::InvalidTransition {
                action: "guess",
                phase: self.phase,
            });
        }
        let key = normalize_key(key).ok_or(SessionError::InvalidKey(key))?;
        if self.correct_keys.contains(&key) || self.incorrect_keys.contains(&key) {
            debug_log!("guess() - '{}' already tried", key);
            return Ok(GuessOutcome::Repeated);
        }
        let Some(entry) = self.current.as_ref() else {
            return Err(SessionError::InvalidTransition {
                action: "guess",
                phase: self.phase,
            });
        };

        let mut hits = 0;
        for (slot, letter) in self.reveal.iter_mut().zip(entry.word.chars()) {
            if letter == key {
                *slot = letter;
                hits += 1;
            }
        }

        let outcome = if hits == 0 {
            self.incorrect_keys.insert(key);
            self.lives = self.lives.saturating_sub(1);
            GuessOutcome::Miss
        } else {
            self.correct_keys.insert(key);
            GuessOutcome::Hit(hits)
        };

        if self.lives == 0 {
            info_log!("guess() - out of lives at level {}", self.level);
            self.phase = GamePhase::Lost;
        } else if !self.reveal.contains(&PLACEHOLDER) {
            info_log!("guess() - word solved at level {}", self.level);
            self.phase = GamePhase::Won;
            self.streak += 1;
        }
        Ok(outcome)
    }

    /// Moves on after a finished round.
    ///
    /// From `Won` the next level of the same batch is queued. From `Lost` the
    /// whole run restarts: level 1, empty batch, new epoch.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        match self.phase {
            GamePhase::Won => {
                self.level += 1;
            }
            GamePhase::Lost => {
                self.level = 1;
                self.streak = 0;
                self.batch.clear();
                self.epoch += 1;
                self.fetch_in_flight = false;
            }
            GamePhase::Waiting | GamePhase::Playing => {
                return Err(SessionError::InvalidTransition {
                    action: "advance",
                    phase: self.phase,
                });
            }
        }
        info_log!("advance() - level {} epoch {}", self.level, self.epoch);
        self.current = None;
        self.reveal.clear();
        self.phase = GamePhase::Waiting;
        Ok(())
    }

    pub fn view(&self) -> SessionView {
        let (category, hint) = self
            .current
            .as_ref()
            .map(|e| (e.category.clone(), e.hint.clone()))
            .unwrap_or_default();
        SessionView {
            phase: self.phase,
            level: self.level,
            streak: self.streak,
            category,
            hint,
            reveal: self.reveal(),
            lives: self.lives,
            max_lives: self.config.max_lives(),
            correct_keys: self.correct_keys.iter().collect(),
            incorrect_keys: self.incorrect_keys.iter().collect(),
            answer: self.answer().map(str::to_string),
            visible_parts: self.visible_parts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameMode;

    fn entry(word: &str) -> WordEntry {
        WordEntry::new("Test", word, "a hint")
    }

    fn playing(word: &str) -> GameSession {
        let mut session = GameSession::new(SessionConfig::default());
        session.load_batch(vec![entry(word)]);
        assert!(session.activate_level());
        session
    }

    #[test]
    fn test_new_session_is_waiting() {
        let session = GameSession::new(SessionConfig::default());
        assert_eq!(session.phase(), GamePhase::Waiting);
        assert_eq!(session.lives(), 7);
        assert_eq!(session.level(), 1);
        assert!(session.batch().is_empty());
        assert!(session.current_entry().is_none());
    }

    #[test]
    fn test_cat_scenario() {
        let mut session = playing("cat");
        assert_eq!(session.reveal(), "___");

        assert_eq!(session.guess('X').unwrap(), GuessOutcome::Miss);
        assert_eq!(session.lives(), 6);
        assert_eq!(session.reveal(), "___");

        assert_eq!(session.guess('C').unwrap(), GuessOutcome::Hit(1));
        assert_eq!(session.reveal(), "C__");
        session.guess('A').unwrap();
        assert_eq!(session.reveal(), "CA_");
        session.guess('T').unwrap();
        assert_eq!(session.reveal(), "CAT");
        assert_eq!(session.phase(), GamePhase::Won);
        assert_eq!(session.answer(), Some("CAT"));
        assert_eq!(session.streak(), 1);
    }

    #[test]
    fn test_dog_scenario_loses_on_seventh_miss() {
        let mut session = playing("DOG");
        for (i, key) in "XZQJVWK".chars().enumerate() {
            assert_eq!(session.phase(), GamePhase::Playing, "before miss {i}");
            session.guess(key).unwrap();
        }
        assert_eq!(session.phase(), GamePhase::Lost);
        assert_eq!(session.lives(), 0);
        assert_eq!(session.reveal(), "___");
        assert_eq!(session.answer(), Some("DOG"));
        assert_eq!(session.visible_parts(), 7);
    }

    #[test]
    fn test_ice_cream_reveal_keeps_space() {
        let session = playing("ICE CREAM");
        assert_eq!(session.reveal(), "___ _____");
    }

    #[test]
    fn test_guess_reveals_every_occurrence() {
        let mut session = playing("BANANA");
        assert_eq!(session.guess('a').unwrap(), GuessOutcome::Hit(3));
        assert_eq!(session.reveal(), "_A_A_A");
    }

    #[test]
    fn test_repeated_guess_is_idempotent() {
        let mut session = playing("DOG");
        session.guess('X').unwrap();
        session.guess('D').unwrap();
        let before = session.view();

        assert_eq!(session.guess('X').unwrap(), GuessOutcome::Repeated);
        assert_eq!(session.guess('d').unwrap(), GuessOutcome::Repeated);
        assert_eq!(session.view(), before);
        assert_eq!(session.lives(), 6);
        assert_eq!(session.incorrect_keys().len(), 1);
        assert_eq!(session.correct_keys().len(), 1);
    }

    #[test]
    fn test_invalid_key_rejected_without_change() {
        let mut session = playing("DOG");
        let before = session.view();
        assert!(matches!(
            session.guess('-'),
            Err(SessionError::InvalidKey('-'))
        ));
        assert_eq!(session.view(), before);
    }

    #[test]
    fn test_digits_are_guessable() {
        let mut session = playing("R2D2");
        assert_eq!(session.guess('2').unwrap(), GuessOutcome::Hit(2));
        assert_eq!(session.reveal(), "_2_2");
    }

    #[test]
    fn test_guess_outside_playing_is_rejected() {
        let mut session = GameSession::new(SessionConfig::default());
        assert!(matches!(
            session.guess('A'),
            Err(SessionError::InvalidTransition { phase: GamePhase::Waiting, .. })
        ));

        let mut won = playing("A");
        won.guess('A').unwrap();
        assert_eq!(won.phase(), GamePhase::Won);
        assert!(won.guess('B').is_err());
        assert_eq!(won.lives(), 7);
    }

    #[test]
    fn test_advance_from_won_keeps_batch() {
        let mut session = GameSession::new(SessionConfig::default());
        session.load_batch(vec![entry("A"), entry("B")]);
        session.activate_level();
        session.guess('A').unwrap();

        session.advance().unwrap();
        assert_eq!(session.level(), 2);
        assert_eq!(session.batch().len(), 2);
        assert_eq!(session.phase(), GamePhase::Waiting);

        assert!(session.activate_level());
        assert_eq!(session.current_entry().unwrap().word, "B");
        assert_eq!(session.lives(), 7);
    }

    #[test]
    fn test_advance_from_lost_resets_run() {
        let mut session = GameSession::new(SessionConfig::default().with_max_lives(1));
        session.load_batch(vec![entry("A"), entry("B")]);
        session.activate_level();
        session.guess('Z').unwrap();
        assert_eq!(session.phase(), GamePhase::Lost);

        let epoch = session.epoch();
        session.advance().unwrap();
        assert_eq!(session.level(), 1);
        assert!(session.batch().is_empty());
        assert_eq!(session.epoch(), epoch + 1);
        assert_eq!(session.streak(), 0);
        assert!(!session.activate_level());
    }

    #[test]
    fn test_zero_lives_config_still_allows_one_miss() {
        let mut session = GameSession::new(SessionConfig::default().with_max_lives(0));
        session.load_batch(vec![entry("A")]);
        assert!(session.activate_level());
        assert_eq!(session.lives(), 1);
        assert_eq!(session.guess('Z').unwrap(), GuessOutcome::Miss);
        assert_eq!(session.lives(), 0);
        assert_eq!(session.phase(), GamePhase::Lost);
    }

    #[test]
    fn test_advance_rejected_while_playing_or_waiting() {
        let mut waiting = GameSession::new(SessionConfig::default());
        assert!(waiting.advance().is_err());
        assert_eq!(waiting.phase(), GamePhase::Waiting);

        let mut session = playing("DOG");
        assert!(session.advance().is_err());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.level(), 1);
    }

    #[test]
    fn test_activate_level_only_when_ready() {
        let mut session = GameSession::new(SessionConfig::default());
        assert!(!session.activate_level());
        session.load_batch(vec![]);
        assert!(!session.activate_level());
        assert_eq!(session.phase(), GamePhase::Waiting);

        session.load_batch(vec![entry("dog")]);
        assert!(session.activate_level());
        assert!(!session.activate_level());
        assert_eq!(session.current_entry().unwrap().word, "DOG");
    }

    #[test]
    fn test_begin_fetch_is_single_flight() {
        let mut session = GameSession::new(SessionConfig::default());
        let request = session.begin_fetch(std::iter::empty()).unwrap();
        assert_eq!(request.count, BATCH_SIZE);
        assert!(session.is_fetch_in_flight());
        assert!(session.begin_fetch(std::iter::empty()).is_none());
    }

    #[test]
    fn test_begin_fetch_exclusions_respect_no_repeat() {
        let used = ["OLD"];
        let mut session = GameSession::new(SessionConfig::default());
        let request = session.begin_fetch(used).unwrap();
        assert!(request.exclude_words.is_empty());

        let config = SessionConfig::new(GameMode::Custom, Some("birds")).with_cant_repeat_words(true);
        let mut session = GameSession::new(config);
        let request = session.begin_fetch(used).unwrap();
        assert_eq!(request.exclude_words, vec!["OLD"]);
        assert_eq!(request.instructions, "birds");
    }

    #[test]
    fn test_begin_fetch_excludes_session_words() {
        let mut session = GameSession::new(SessionConfig::default());
        session.load_batch(vec![entry("owl"), entry("emu")]);
        let request = session.begin_fetch(std::iter::empty()).unwrap();
        assert_eq!(request.exclude_words, vec!["OWL", "EMU"]);
    }

    #[test]
    fn test_batch_arrival_applies_and_clears_flight() {
        let mut session = GameSession::new(SessionConfig::default());
        session.begin_fetch(std::iter::empty()).unwrap();
        let arrival = session.on_batch_arrived(0, Ok(vec![entry("cat")])).unwrap();
        assert_eq!(arrival, BatchArrival::Applied(1));
        assert!(!session.is_fetch_in_flight());
        assert_eq!(session.phase(), GamePhase::Waiting);
        assert!(session.activate_level());
    }

    #[test]
    fn test_empty_cold_start_surfaces_error() {
        let mut session = GameSession::new(SessionConfig::default());
        session.begin_fetch(std::iter::empty()).unwrap();
        let err = session.on_batch_arrived(0, Ok(vec![])).unwrap_err();
        assert!(matches!(err, SessionError::Supplier(SupplierError::EmptyBatch)));
        assert_eq!(session.phase(), GamePhase::Waiting);
        assert!(session.batch().is_empty());
        assert!(!session.is_fetch_in_flight());
    }

    #[test]
    fn test_failed_fetch_keeps_existing_batch() {
        let mut session = GameSession::new(SessionConfig::default());
        session.load_batch(vec![entry("cat")]);
        session.begin_fetch(std::iter::empty()).unwrap();
        let err = session.on_batch_arrived(0, Err(SupplierError::Malformed("bad".into())));
        assert!(err.is_err());
        assert_eq!(session.batch().len(), 1);
    }

    #[test]
    fn test_stale_batch_after_reset_is_ignored() {
        let mut session = GameSession::new(SessionConfig::default().with_max_lives(1));
        session.load_batch(vec![entry("A")]);
        session.activate_level();
        session.begin_fetch(std::iter::empty()).unwrap();
        session.guess('Z').unwrap();
        session.advance().unwrap();
        assert!(!session.is_fetch_in_flight());

        let fresh = session.begin_fetch(std::iter::empty()).unwrap();
        assert!(fresh.exclude_words.is_empty());

        let stale = session.on_batch_arrived(0, Ok(vec![entry("OLD")])).unwrap();
        assert_eq!(stale, BatchArrival::Stale);
        assert!(session.batch().is_empty());
        assert!(session.is_fetch_in_flight());

        let applied = session.on_batch_arrived(1, Ok(vec![entry("NEW")])).unwrap();
        assert_eq!(applied, BatchArrival::Applied(1));
        session.activate_level();
        assert_eq!(session.current_entry().unwrap().word, "NEW");
    }

    #[test]
    fn test_view_reports_keys_and_parts() {
        let mut session = playing("DOG");
        session.guess('X').unwrap();
        session.guess('O').unwrap();
        let view = session.view();
        assert_eq!(view.reveal, "_O_");
        assert_eq!(view.correct_keys, "O");
        assert_eq!(view.incorrect_keys, "X");
        assert_eq!(view.visible_parts, 1);
        assert!(view.is_disabled('X'));
        assert!(!view.is_disabled('D'));
        assert!(view.answer.is_none());
        assert_eq!(view.category, "Test");
    }
}
