use clap::{Parser, Subcommand};
use crate::config::{GameMode, SessionConfig};
use crate::error::SessionError;
use crate::figure;
use crate::game_state::{GameInterface, UserAction};
use crate::session::{GamePhase, SessionView};
use crate::supplier::gemini::DEFAULT_MODEL;
use crate::word::KEYBOARD_ROWS;
use std::io::BufRead;
use std::path::PathBuf;

/// Hangman with AI-generated words and hints
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Difficulty of the generated words
    #[arg(short, long, value_enum, default_value_t = GameMode::Easy)]
    pub difficulty: GameMode,

    /// Theme for the generated words (implies a custom game)
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// Allow multi-word phrases and richer hints
    #[arg(long)]
    pub rich: bool,

    /// Never repeat a word solved in an earlier game
    #[arg(long = "no-repeat")]
    pub no_repeat: bool,

    /// Game route, e.g. "/game/custom?instructions=space&richMode=true"
    #[arg(long, conflicts_with_all = ["difficulty", "instructions", "rich", "no_repeat"])]
    pub route: Option<String>,

    /// Lives per word
    #[arg(long, default_value_t = figure::BodyPart::COUNT, value_parser = clap::value_parser!(u8).range(1..=26))]
    pub lives: u8,

    /// Line-based interface instead of the full-screen one
    #[arg(long)]
    pub cli: bool,

    /// Use the built-in word bank instead of the AI service
    #[arg(long)]
    pub offline: bool,

    /// API key for the Gemini word service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Directory for saved words, history and favorites
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory
    #[arg(long)]
    pub no_save: bool,

    /// Append logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show recent instructions and favorites
    History,
    /// Add or remove a favorite instruction
    Favorite { text: String },
}

impl Cli {
    /// Session configuration from the route or the individual flags.
    pub fn session_config(&self) -> Result<SessionConfig, String> {
        let config = match &self.route {
            Some(route) => SessionConfig::from_route(route)?,
            None => {
                let mode = if self.instructions.is_some() {
                    GameMode::Custom
                } else {
                    self.difficulty
                };
                SessionConfig::new(mode, self.instructions.as_deref())
                    .with_rich_mode(self.rich)
                    .with_cant_repeat_words(self.no_repeat)
            }
        };
        Ok(config.with_max_lives(self.lives))
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// UI Input/Output functions

fn parse_action(input: &str) -> Option<UserAction> {
    let input = input.trim().to_uppercase();
    match input.as_str() {
        "EXIT" | "QUIT" => Some(UserAction::Exit),
        "NEXT" | "RESTART" => Some(UserAction::Advance),
        "HINT" | "?" => Some(UserAction::Hint),
        _ => {
            let mut chars = input.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(UserAction::Guess(c)),
                _ => None,
            }
        }
    }
}

/// Spaced-out reveal, e.g. `C _ _   _ _`.
pub fn format_reveal(reveal: &str) -> String {
    reveal
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keyboard rows with tried keys replaced: `+` for hits, `-` for misses.
pub fn format_keyboard(view: &SessionView) -> Vec<String> {
    KEYBOARD_ROWS
        .iter()
        .map(|row| {
            row.chars()
                .map(|key| {
                    if view.correct_keys.contains(key) {
                        '+'
                    } else if view.incorrect_keys.contains(key) {
                        '-'
                    } else {
                        key
                    }
                })
                .map(String::from)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

pub fn display_session(view: &SessionView) {
    println!();
    for line in figure::render_ascii(view.lives, view.max_lives) {
        println!("{line}");
    }
    println!(
        "Level {} | Streak {} | Lives {}/{}",
        view.level, view.streak, view.lives, view.max_lives
    );
    println!("Category: {}", view.category);
    println!("Hint: {}", view.hint);
    println!("\n  {}\n", format_reveal(&view.reveal));
    for row in format_keyboard(view) {
        println!("  {row}");
    }

    match view.phase {
        GamePhase::Won => {
            println!("\nYOU WON! Type 'next' for the next word.");
        }
        GamePhase::Lost => {
            println!("\nGAME OVER");
            if let Some(answer) = &view.answer {
                println!("The word was: {answer}");
            }
            println!("Type 'restart' to play again.");
        }
        GamePhase::Playing | GamePhase::Waiting => {}
    }
}

pub fn read_action<R: BufRead>(reader: &mut R) -> Option<UserAction> {
    println!("\nEnter a letter or digit ('hint', 'next', 'restart', 'exit'):");
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) | Err(_) => return Some(UserAction::Exit),
        Ok(_) => {}
    }

    let action = parse_action(&input);
    if action.is_none() {
        println!("Invalid input. Enter a single letter or digit, or a command.");
    }
    action
}

pub fn display_loading(level: usize) {
    println!("Generating words for level {level}, please wait...");
}

pub fn display_hint(hint: &str) {
    println!("Tricky hint: {hint}");
}

pub fn display_message(message: &str) {
    println!("{message}");
}

pub fn display_error(error: &SessionError) {
    println!("Oops! Something went wrong: {error}");
}

pub fn display_exit_message() {
    println!("Exiting.");
}

pub fn display_history(history: &[String], favorites: &[String]) {
    println!("Favorites:");
    if favorites.is_empty() {
        println!("  (none)");
    }
    for favorite in favorites {
        println!("  * {favorite}");
    }
    println!("Recent instructions:");
    if history.is_empty() {
        println!("  (none)");
    }
    for (i, entry) in history.iter().enumerate() {
        println!("  {}. {}", i + 1, entry);
    }
}

/// CLI implementation of the GameInterface trait
/// This struct wraps a BufRead reader and implements the game interface for CLI interaction
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn display_loading(&mut self, level: usize) {
        display_loading(level);
    }

    fn display_session(&mut self, view: &SessionView) {
        display_session(view);
    }

    fn read_action(&mut self) -> Option<UserAction> {
        read_action(&mut self.reader)
    }

    fn display_hint(&mut self, hint: &str) {
        display_hint(hint);
    }

    fn display_message(&mut self, message: &str) {
        display_message(message);
    }

    fn display_error(&mut self, error: &SessionError) {
        display_error(error);
    }

    fn display_exit_message(&mut self) {
        display_exit_message();
    }
}
