//! Session configuration and the `/game/<mode>?...` route surface.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use percent_encoding::percent_decode_str;

use crate::figure::BodyPart;

/// Difficulty passed to the word supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game mode selected from the home screen or the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GameMode {
    #[default]
    Easy,
    Medium,
    Hard,
    Custom,
}

impl GameMode {
    /// Custom games are generated at medium difficulty.
    pub fn difficulty(self) -> Difficulty {
        match self {
            Self::Easy => Difficulty::Easy,
            Self::Medium | Self::Custom => Difficulty::Medium,
            Self::Hard => Difficulty::Hard,
        }
    }

    fn default_instructions(self) -> &'static str {
        match self {
            Self::Easy => "Common everyday words that a child would know.",
            Self::Medium => "Well-known words from general knowledge topics.",
            Self::Hard => "Uncommon, tricky words from specialised topics.",
            Self::Custom => "Any interesting words.",
        }
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Immutable configuration of a game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: GameMode,
    pub instructions: String,
    pub rich_mode: bool,
    pub cant_repeat_words: bool,
    max_lives: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(GameMode::default(), None)
    }
}

impl SessionConfig {
    /// Builds a config, filling in the mode's default instructions when none are given.
    pub fn new(mode: GameMode, instructions: Option<&str>) -> Self {
        let instructions = instructions
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| mode.default_instructions())
            .to_string();
        Self {
            mode,
            instructions,
            rich_mode: false,
            cant_repeat_words: false,
            max_lives: BodyPart::COUNT,
        }
    }

    #[must_use]
    pub fn with_rich_mode(mut self, rich_mode: bool) -> Self {
        self.rich_mode = rich_mode;
        self
    }

    #[must_use]
    pub fn with_cant_repeat_words(mut self, cant_repeat_words: bool) -> Self {
        self.cant_repeat_words = cant_repeat_words;
        self
    }

    #[must_use]
    pub fn with_max_lives(mut self, max_lives: u8) -> Self {
        self.max_lives = max_lives.max(1);
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.mode.difficulty()
    }

    /// Lives per word, never below 1.
    pub fn max_lives(&self) -> u8 {
        self.max_lives
    }

    /// Parses a route such as `/game/custom?instructions=space&richMode=true`.
    ///
    /// `/game/` without a mode plays easy.
    pub fn from_route(route: &str) -> Result<Self, String> {
        let (path, query) = route.split_once('?').unwrap_or((route, ""));
        let mut segments = path.trim_matches('/').split('/');
        if segments.next() != Some("game") {
            return Err(format!("not a game route: '{route}'"));
        }
        let mode = match segments.next() {
            None | Some("") => GameMode::default(),
            Some(mode) => mode.parse()?,
        };
        if segments.next().is_some() {
            return Err(format!("not a game route: '{route}'"));
        }

        let mut instructions = None;
        let mut rich_mode = false;
        let mut cant_repeat_words = false;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_query_value(value);
            match key {
                "instructions" => instructions = Some(value),
                "richMode" => rich_mode = parse_flag(&value),
                "cantRepeatWords" => cant_repeat_words = parse_flag(&value),
                _ => {}
            }
        }

        Ok(Self::new(mode, instructions.as_deref())
            .with_rich_mode(rich_mode)
            .with_cant_repeat_words(cant_repeat_words))
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "true" | "1" | "yes" | "on")
}

/// Decodes `+` and `%XX` escapes; malformed escapes are kept literally.
fn decode_query_value(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
