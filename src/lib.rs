// Library interface for hangman
// This allows integration tests to access internal modules

pub mod cli;
pub mod config;
pub mod error;
pub mod figure;
pub mod game_state;
pub mod logging;
pub mod prefetch;
pub mod session;
pub mod store;
pub mod supplier;
pub mod tui;
pub mod word;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use config::{Difficulty, GameMode, SessionConfig};
pub use error::{HangmanError, SessionError, StoreError, SupplierError};
pub use game_state::{Game, GameInterface, GameSummary, UserAction};
pub use prefetch::{Fetcher, build_exclusions, should_fetch};
pub use session::{GamePhase, GameSession, GuessOutcome, SessionView};
pub use store::{FileStore, InstructionBook, KeyValueStore, MemoryStore, UsedWordsLog};
pub use supplier::{FetchRequest, GeminiSupplier, WordSupplier};
pub use word::WordEntry;
pub use wordbank::WordBank;
