//! The game loop: wires the session, the fetcher, persistence and a front end.

use crate::error::{SessionError, SupplierError};
use crate::prefetch::Fetcher;
use crate::session::{GamePhase, GameSession, GuessOutcome, SessionView};
use crate::store::{KeyValueStore, UsedWordsLog};
use crate::{debug_log, info_log};

/// What the player asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Guess(char),
    /// "Next Word" after a win, "Restart" after a loss.
    Advance,
    Hint,
    Exit,
}

/// Front end driven by [`Game::run`].
pub trait GameInterface {
    fn display_loading(&mut self, level: usize);

    fn display_session(&mut self, view: &SessionView);

    /// Returns `None` when no action is available yet (invalid input or timeout).
    fn read_action(&mut self) -> Option<UserAction>;

    fn display_hint(&mut self, hint: &str);

    fn display_message(&mut self, message: &str);

    /// Shown when word generation fails; the loop ends afterwards.
    fn display_error(&mut self, error: &SessionError);

    fn display_exit_message(&mut self);
}

/// Totals over one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameSummary {
    pub words_won: u32,
    pub words_lost: u32,
    pub best_streak: u32,
}

/// A session together with everything it talks to.
pub struct Game<S: KeyValueStore> {
    session: GameSession,
    fetcher: Fetcher,
    store: S,
    used_words: UsedWordsLog,
    summary: GameSummary,
    /// Failed lookahead fetch and the epoch it belongs to, reported once the batch runs out.
    pending_failure: Option<(u64, SessionError)>,
}

impl<S: KeyValueStore> Game<S> {
    pub fn new(session: GameSession, fetcher: Fetcher, store: S, used_words: UsedWordsLog) -> Self {
        Self {
            session,
            fetcher,
            store,
            used_words,
            summary: GameSummary::default(),
            pending_failure: None,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn used_words(&self) -> &UsedWordsLog {
        &self.used_words
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs until the player exits or word generation fails.
    pub fn run<I: GameInterface>(&mut self, interface: &mut I) -> Result<GameSummary, SessionError> {
        loop {
            self.trigger_prefetch();
            self.collect_arrival(interface)?;

            if self.session.activate_level() {
                interface.display_session(&self.session.view());
            }
            if self.session.phase() == GamePhase::Waiting {
                continue;
            }

            let Some(action) = interface.read_action() else {
                continue;
            };
            debug_log!("run() - action {:?}", action);
            match action {
                UserAction::Exit => {
                    interface.display_exit_message();
                    return Ok(self.summary);
                }
                UserAction::Guess(key) => self.handle_guess(key, interface),
                UserAction::Advance => {
                    if let Err(e) = self.session.advance() {
                        interface.display_message(&e.to_string());
                    }
                }
                UserAction::Hint => self.handle_hint(interface),
            }
        }
    }

    fn trigger_prefetch(&mut self) {
        // A restart starts a new epoch and forgets the old run's failure.
        if self
            .pending_failure
            .as_ref()
            .is_some_and(|(epoch, _)| *epoch != self.session.epoch())
        {
            self.pending_failure = None;
        }
        if self.pending_failure.is_some() {
            return;
        }
        if let Some(request) = self.session.begin_fetch(self.used_words.iter()) {
            self.fetcher.spawn(self.session.epoch(), request);
        }
    }

    /// Applies at most one supplier outcome, blocking only while no word is ready.
    ///
    /// A failure only ends the run when the batch has no word for the current
    /// level; until then the player keeps playing the words already loaded.
    fn collect_arrival<I: GameInterface>(&mut self, interface: &mut I) -> Result<(), SessionError> {
        let outcome = if self.session.phase() == GamePhase::Waiting && !self.session.level_ready() {
            if let Some((_, error)) = self.pending_failure.take() {
                return Err(Self::fail(interface, error));
            }
            interface.display_loading(self.session.level());
            match self.fetcher.wait() {
                Some(outcome) => outcome,
                None => {
                    let error = SupplierError::Aborted("no fetch in flight".to_string()).into();
                    return Err(Self::fail(interface, error));
                }
            }
        } else {
            match self.fetcher.poll() {
                Some(outcome) => outcome,
                None => return Ok(()),
            }
        };

        match self.session.on_batch_arrived(outcome.epoch, outcome.result) {
            Ok(arrival) => {
                debug_log!("collect_arrival() - {:?}", arrival);
                Ok(())
            }
            Err(e) if self.session.level_ready() => {
                log::warn!("Lookahead fetch failed, continuing with the current batch: {e}");
                interface.display_message(&format!("Could not load more words: {e}"));
                self.pending_failure = Some((outcome.epoch, e));
                Ok(())
            }
            Err(e) => Err(Self::fail(interface, e)),
        }
    }

    fn fail<I: GameInterface>(interface: &mut I, error: SessionError) -> SessionError {
        log::error!("Word generation failed: {error}");
        interface.display_error(&error);
        error
    }

    fn handle_guess<I: GameInterface>(&mut self, key: char, interface: &mut I) {
        match self.session.guess(key) {
            Ok(GuessOutcome::Repeated) => {
                interface.display_message(&format!("'{}' was already tried", key.to_ascii_uppercase()));
            }
            Ok(_) => match self.session.phase() {
                GamePhase::Won => {
                    if let Some(word) = self.session.current_entry().map(|e| e.word.clone()) {
                        info_log!("Recording solved word at level {}", self.session.level());
                        self.used_words.record(&mut self.store, &word);
                    }
                    self.summary.words_won += 1;
                    self.summary.best_streak = self.summary.best_streak.max(self.session.streak());
                }
                GamePhase::Lost => self.summary.words_lost += 1,
                GamePhase::Playing | GamePhase::Waiting => {}
            },
            Err(e) => interface.display_message(&e.to_string()),
        }
        interface.display_session(&self.session.view());
    }

    fn handle_hint<I: GameInterface>(&mut self, interface: &mut I) {
        if self.session.phase() != GamePhase::Playing {
            interface.display_message("Hints are only available while guessing");
            return;
        }
        if let Some(entry) = self.session.current_entry() {
            let hint = self.fetcher.tricky_hint(entry);
            interface.display_hint(&hint);
        }
    }
}
