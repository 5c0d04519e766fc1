// Integration tests for the hangman application
// These tests drive the game loop through the CLI interface with scripted suppliers

use async_trait::async_trait;
use hangman::cli::CliInterface;
use hangman::store::DEFAULT_USED_WORDS_CAP;
use hangman::*;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Serves pre-baked batches in order and records every request.
struct ScriptedSupplier {
    batches: Mutex<VecDeque<Vec<WordEntry>>>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

#[async_trait]
impl WordSupplier for ScriptedSupplier {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<WordEntry>, SupplierError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }
}

fn scripted(batches: Vec<Vec<WordEntry>>) -> (Fetcher, Arc<Mutex<Vec<FetchRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let supplier = ScriptedSupplier {
        batches: Mutex::new(batches.into()),
        requests: Arc::clone(&requests),
    };
    (Fetcher::new(Arc::new(supplier)).unwrap(), requests)
}

/// Ten entries starting with `first`, so the first level never triggers a refill.
fn batch(first: &[&str]) -> Vec<WordEntry> {
    let mut entries: Vec<WordEntry> = first
        .iter()
        .map(|w| WordEntry::new("Animals", w, "A common animal"))
        .collect();
    entries.resize(10, WordEntry::new("Filler", "zebra", "Striped"));
    entries
}

#[test]
fn test_end_to_end_win_through_cli() {
    let (fetcher, requests) = scripted(vec![batch(&["cat"])]);
    let store = MemoryStore::new();
    let used = UsedWordsLog::load(&store, DEFAULT_USED_WORDS_CAP);
    let session = GameSession::new(SessionConfig::default());
    let mut game = Game::new(session, fetcher, store, used);

    // A miss, a repeat, an invalid line, then the word.
    let input = "x\nx\nhello\nc\na\nt\nexit\n";
    let mut interface = CliInterface::new(Cursor::new(input));
    let summary = game.run(&mut interface).unwrap();

    assert_eq!(summary.words_won, 1);
    assert_eq!(summary.best_streak, 1);
    assert_eq!(game.session().phase(), GamePhase::Won);
    assert_eq!(game.session().lives(), 6);
    assert_eq!(game.used_words().words(), ["CAT"]);

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].count, 10);
    assert_eq!(requests[0].difficulty, Difficulty::Easy);
}

#[test]
fn test_next_word_then_loss_and_restart() {
    let (fetcher, requests) = scripted(vec![batch(&["cat", "dog"]), batch(&["owl"])]);
    let store = MemoryStore::new();
    let used = UsedWordsLog::load(&store, DEFAULT_USED_WORDS_CAP);
    let config = SessionConfig::default().with_max_lives(3);
    let mut game = Game::new(GameSession::new(config), fetcher, store, used);

    let input = "c\na\nt\nnext\nq\nz\nj\nrestart\no\nexit\n";
    let mut interface = CliInterface::new(Cursor::new(input));
    let summary = game.run(&mut interface).unwrap();

    assert_eq!(summary.words_won, 1);
    assert_eq!(summary.words_lost, 1);
    assert_eq!(game.session().level(), 1);
    assert_eq!(game.session().streak(), 0);
    assert_eq!(game.session().epoch(), 1);
    assert_eq!(game.session().reveal(), "O__");
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[test]
fn test_cold_start_failure_ends_the_loop() {
    let (fetcher, _) = scripted(vec![]);
    let store = MemoryStore::new();
    let used = UsedWordsLog::load(&store, DEFAULT_USED_WORDS_CAP);
    let mut game = Game::new(GameSession::new(SessionConfig::default()), fetcher, store, used);

    let mut interface = CliInterface::new(Cursor::new("a\n"));
    let err = game.run(&mut interface).unwrap_err();
    assert!(matches!(err, SessionError::Supplier(SupplierError::EmptyBatch)));
    assert!(game.session().batch().is_empty());
}

#[test]
fn test_offline_word_bank_game() {
    let fetcher = Fetcher::new(Arc::new(WordBank::embedded())).unwrap();
    let store = MemoryStore::new();
    let used = UsedWordsLog::load(&store, DEFAULT_USED_WORDS_CAP);
    // Enough lives to try every key.
    let config = SessionConfig::default().with_max_lives(26);
    let mut game = Game::new(GameSession::new(config), fetcher, store, used);

    let mut input: String = ('A'..='Z').map(|c| format!("{c}\n")).collect();
    input.push_str("exit\n");
    let mut interface = CliInterface::new(Cursor::new(input));
    let summary = game.run(&mut interface).unwrap();

    assert_eq!(summary.words_won, 1);
    assert_eq!(game.session().phase(), GamePhase::Won);
    assert_eq!(game.session().batch().len(), 10);
    assert_eq!(game.used_words().words().len(), 1);
}

#[test]
fn test_offline_word_bank_plays_every_word_before_running_dry() {
    let fetcher = Fetcher::new(Arc::new(WordBank::embedded())).unwrap();
    let store = MemoryStore::new();
    let used = UsedWordsLog::load(&store, DEFAULT_USED_WORDS_CAP);
    let config = SessionConfig::default().with_max_lives(26);
    let mut game = Game::new(GameSession::new(config), fetcher, store, used);

    let round: String = ('A'..='Z').map(|c| format!("{c}\n")).collect();
    let input = format!("{round}next\n").repeat(60);
    let mut interface = CliInterface::new(Cursor::new(input));
    let err = game.run(&mut interface).unwrap_err();

    assert!(matches!(err, SessionError::Supplier(SupplierError::EmptyBatch)));
    let loaded = game.session().batch().len();
    assert!(loaded > 10);
    assert_eq!(game.session().phase(), GamePhase::Waiting);
    assert_eq!(game.session().level(), loaded + 1);
    assert_eq!(game.used_words().words().len(), loaded);
}

#[test]
fn test_no_repeat_excludes_words_from_previous_run() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (fetcher, _) = scripted(vec![batch(&["cat"])]);
        let store = FileStore::new(dir.path()).unwrap();
        let used = UsedWordsLog::load(&store, DEFAULT_USED_WORDS_CAP);
        let mut game = Game::new(GameSession::new(SessionConfig::default()), fetcher, store, used);
        let mut interface = CliInterface::new(Cursor::new("c\na\nt\nexit\n"));
        game.run(&mut interface).unwrap();
    }

    let (fetcher, requests) = scripted(vec![batch(&["dog"])]);
    let store = FileStore::new(dir.path()).unwrap();
    let used = UsedWordsLog::load(&store, DEFAULT_USED_WORDS_CAP);
    assert_eq!(used.words(), ["CAT"]);

    let config = SessionConfig::new(GameMode::Medium, None).with_cant_repeat_words(true);
    let mut game = Game::new(GameSession::new(config), fetcher, store, used);
    let mut interface = CliInterface::new(Cursor::new("exit\n"));
    game.run(&mut interface).unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0].exclude_words, ["CAT"]);
    assert_eq!(requests[0].difficulty, Difficulty::Medium);
}

#[test]
fn test_instruction_book_persists_across_stores() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path()).unwrap();
    let mut book = InstructionBook::load(&store);
    book.remember(&mut store, "rivers of europe");
    book.remember(&mut store, "space missions");
    assert!(book.toggle_favorite(&mut store, "space missions"));

    let reopened = FileStore::new(dir.path()).unwrap();
    let book = InstructionBook::load(&reopened);
    assert_eq!(book.last_input, "space missions");
    assert_eq!(book.history, ["space missions", "rivers of europe"]);
    assert_eq!(book.favorites, ["space missions"]);
}

#[test]
fn test_route_drives_custom_game_request() {
    let config =
        SessionConfig::from_route("/game/custom?instructions=planets%20and%20moons&richMode=true")
            .unwrap();
    let mut session = GameSession::new(config);
    let request = session.begin_fetch(std::iter::empty::<&str>()).unwrap();
    assert_eq!(request.instructions, "planets and moons");
    assert_eq!(request.difficulty, Difficulty::Medium);
    assert!(request.rich_mode);
    assert!(session.begin_fetch(std::iter::empty::<&str>()).is_none());
}

proptest! {
    #[test]
    fn test_any_order_of_distinct_letters_wins(
        order in Just(vec!['E', 'L', 'P', 'H', 'A', 'N', 'T']).prop_shuffle()
    ) {
        let mut session = GameSession::new(SessionConfig::default());
        session.load_batch(vec![WordEntry::new("Animals", "elephant", "Has a trunk")]);
        prop_assert!(session.activate_level());

        for key in order {
            prop_assert_eq!(session.phase(), GamePhase::Playing);
            let outcome = session.guess(key).unwrap();
            prop_assert!(matches!(outcome, GuessOutcome::Hit(_)));
        }
        prop_assert_eq!(session.phase(), GamePhase::Won);
        prop_assert_eq!(session.lives(), session.max_lives());
        prop_assert_eq!(session.reveal(), "ELEPHANT");
    }

    #[test]
    fn test_lives_only_drop_on_misses(keys in proptest::collection::vec(proptest::char::range('A', 'Z'), 0..20)) {
        let mut session = GameSession::new(SessionConfig::default());
        session.load_batch(vec![WordEntry::new("Food", "ice cream", "Cold dessert")]);
        session.activate_level();

        for key in keys {
            let before = session.lives();
            match session.guess(key) {
                Ok(GuessOutcome::Miss) => prop_assert_eq!(session.lives(), before - 1),
                Ok(_) => prop_assert_eq!(session.lives(), before),
                Err(_) => prop_assert!(session.phase() != GamePhase::Playing),
            }
        }
        prop_assert_eq!(
            session.lives() as usize + session.incorrect_keys().len(),
            session.max_lives() as usize
        );
    }
}
