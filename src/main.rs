use hangman::cli::{self, Cli, CliInterface, Command, parse_cli};
use hangman::config::GameMode;
use hangman::error::{HangmanError, Result, SessionError};
use hangman::game_state::{Game, GameSummary};
use hangman::info_log;
use hangman::logging;
use hangman::prefetch::Fetcher;
use hangman::session::GameSession;
use hangman::store::{
    DEFAULT_USED_WORDS_CAP, FileStore, InstructionBook, KeyValueStore, MemoryStore, UsedWordsLog,
};
use hangman::supplier::{GeminiSupplier, WordSupplier};
use hangman::tui::TuiInterface;
use hangman::wordbank::WordBank;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = parse_cli();
    if let Err(e) = logging::init(cli.log_file.as_deref(), cli.verbose) {
        eprintln!("Failed to open log file: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut store = open_store(cli);
    let mut book = InstructionBook::load(&store);

    match &cli.command {
        Some(Command::History) => {
            cli::display_history(&book.history, &book.favorites);
            return Ok(());
        }
        Some(Command::Favorite { text }) => {
            if book.toggle_favorite(&mut store, text) {
                println!("Added to favorites: {}", text.trim());
            } else {
                println!("Removed from favorites: {}", text.trim());
            }
            return Ok(());
        }
        None => {}
    }

    let config = cli.session_config().map_err(HangmanError::Config)?;
    if config.mode == GameMode::Custom {
        book.remember(&mut store, &config.instructions);
    }
    info_log!(
        "Starting {:?} game (rich: {}, no-repeat: {}, lives: {})",
        config.mode,
        config.rich_mode,
        config.cant_repeat_words,
        config.max_lives()
    );

    let fetcher = Fetcher::new(choose_supplier(cli)?)?;
    let used_words = UsedWordsLog::load(&store, DEFAULT_USED_WORDS_CAP);
    let mut game = Game::new(GameSession::new(config), fetcher, store, used_words);

    let summary = if cli.cli {
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock());
        game.run(&mut interface)?
    } else {
        let mut interface = TuiInterface::new()?;
        let result = game.run(&mut interface);
        // Restore the terminal before anything is printed.
        drop(interface);
        result?
    };
    print_summary(&summary);
    Ok(())
}

/// File store unless `--no-save`; falls back to memory when the directory is unusable.
fn open_store(cli: &Cli) -> Box<dyn KeyValueStore> {
    if cli.no_save {
        return Box::new(MemoryStore::new());
    }
    let opened = match &cli.data_dir {
        Some(dir) => FileStore::new(dir.clone()),
        None => FileStore::in_default_location(),
    };
    match opened {
        Ok(store) => {
            info_log!("Saving game data in {}", store.dir().display());
            Box::new(store)
        }
        Err(e) => {
            log::warn!("Game data will not be saved: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

fn choose_supplier(cli: &Cli) -> Result<Arc<dyn WordSupplier>> {
    if !cli.offline {
        match cli.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                info_log!("Using Gemini model {}", cli.model);
                let supplier = GeminiSupplier::new(key, cli.model.as_str()).map_err(SessionError::from)?;
                return Ok(Arc::new(supplier));
            }
            _ => log::warn!("No API key configured, using the built-in word bank"),
        }
    }
    Ok(Arc::new(WordBank::embedded()))
}

fn print_summary(summary: &GameSummary) {
    println!(
        "Words solved: {} | Words lost: {} | Best streak: {}",
        summary.words_won, summary.words_lost, summary.best_streak
    );
}
