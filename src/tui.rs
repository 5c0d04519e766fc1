//! TUI (Terminal User Interface) module for Hangman
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # Screens
//! - `Loading`: a batch of words is being generated
//! - `Board`: figure, word, hint and on-screen keyboard
//! - `Error`: word generation failed; any key returns to the shell
//!
//! # Keys
//! Letters and digits guess, `Enter` moves to the next word or restarts,
//! `Tab` asks for a tricky hint, `Esc` quits.

use crate::error::SessionError;
use crate::figure;
use crate::game_state::{GameInterface, UserAction};
use crate::session::{GamePhase, SessionView};
use crate::word::{KEYBOARD_ROWS, normalize_key};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const DISABLED_STYLE: Style = Style::new().fg(Color::DarkGray);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Loading { level: usize },
    Board,
    Error { message: String },
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    screen: &'a Screen,
    view: Option<&'a SessionView>,
    hint: &'a str,
    message: &'a str,
    status: &'a str,
}

/// Main TUI interface component.
///
/// Manages terminal rendering, input handling, and game state display.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    screen: Screen,
    view: Option<SessionView>,
    hint: String,
    message: String,
    status: String,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal backend created");

        Ok(Self {
            terminal,
            screen: Screen::Loading { level: 1 },
            view: None,
            hint: String::new(),
            message: String::new(),
            status: "Starting...".to_string(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    /// Draw the current UI state to the terminal.
    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = RenderContext {
            screen: &self.screen,
            view: self.view.as_ref(),
            hint: &self.hint,
            message: &self.message,
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    /// Log and handle draw errors appropriately
    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    /// Render the complete UI layout using the provided context.
    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(12),   // Body
                Constraint::Length(3), // Status line
                Constraint::Length(3), // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0], ctx.view);
        match ctx.screen {
            Screen::Loading { level } => Self::render_loading(f, chunks[1], *level),
            Screen::Error { message } => Self::render_error(f, chunks[1], message),
            Screen::Board => match ctx.view {
                Some(view) => Self::render_board(f, chunks[1], view, ctx.hint, ctx.message),
                None => Self::render_loading(f, chunks[1], 1),
            },
        }
        Self::render_status(f, chunks[2], ctx.status);
        Self::render_instructions(f, chunks[3], ctx.screen, ctx.view);
    }

    fn render_title(f: &mut Frame, area: Rect, view: Option<&SessionView>) {
        let title = match view {
            Some(v) => format!("HANGMAN    Level {}    Streak {}", v.level, v.streak),
            None => "HANGMAN".to_string(),
        };
        let title = Paragraph::new(title)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_loading(f: &mut Frame, area: Rect, level: usize) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Generating words...", INFO_STYLE)),
            Line::from(format!("Preparing level {level}")),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_error(f: &mut Frame, area: Rect, message: &str) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Oops!", ERROR_STYLE.add_modifier(Modifier::BOLD))),
            Line::from("Something went wrong"),
            Line::from(""),
            Line::from(Span::styled(message.to_string(), ERROR_STYLE)),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_board(f: &mut Frame, area: Rect, view: &SessionView, hint: &str, message: &str) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(20), Constraint::Min(30)])
            .split(area);

        Self::render_figure(f, columns[0], view);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Category and hints
                Constraint::Length(3), // Word
                Constraint::Min(6),    // Keyboard or result
            ])
            .split(columns[1]);

        Self::render_info(f, rows[0], view, hint, message);
        Self::render_word(f, rows[1], &view.reveal);
        match view.phase {
            GamePhase::Won | GamePhase::Lost => Self::render_result(f, rows[2], view),
            GamePhase::Playing | GamePhase::Waiting => Self::render_keyboard(f, rows[2], view),
        }
    }

    fn render_figure(f: &mut Frame, area: Rect, view: &SessionView) {
        let lines: Vec<Line> = figure::render_ascii(view.lives, view.max_lives)
            .into_iter()
            .map(Line::from)
            .collect();
        let block = Block::default()
            .title(format!("Lives {}/{}", view.lives, view.max_lives))
            .borders(Borders::ALL);
        f.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_info(f: &mut Frame, area: Rect, view: &SessionView, hint: &str, message: &str) {
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Category: ", INFO_STYLE),
                Span::raw(view.category.clone()),
            ]),
            Line::from(vec![
                Span::styled("Hint: ", INFO_STYLE),
                Span::raw(view.hint.clone()),
            ]),
        ];
        if !hint.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Tricky hint: ", INFO_STYLE),
                Span::raw(hint.to_string()),
            ]));
        }
        if !message.is_empty() {
            lines.push(Line::from(Span::styled(message.to_string(), MESSAGE_STYLE)));
        }
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_word(f: &mut Frame, area: Rect, reveal: &str) {
        let spans: Vec<Span> = reveal
            .chars()
            .map(|c| Span::styled(format!(" {c} "), Style::new().add_modifier(Modifier::BOLD)))
            .collect();
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_keyboard(f: &mut Frame, area: Rect, view: &SessionView) {
        let lines: Vec<Line> = KEYBOARD_ROWS
            .iter()
            .map(|row| {
                let spans: Vec<Span> = row
                    .chars()
                    .map(|key| Span::styled(format!(" {key} "), Self::key_style(view, key)))
                    .collect();
                Line::from(spans)
            })
            .collect();
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title("Keyboard").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn key_style(view: &SessionView, key: char) -> Style {
        if view.correct_keys.contains(key) {
            SUCCESS_STYLE
        } else if view.incorrect_keys.contains(key) {
            ERROR_STYLE.add_modifier(Modifier::CROSSED_OUT)
        } else if view.is_disabled(key) {
            DISABLED_STYLE
        } else {
            Style::new()
        }
    }

    fn render_result(f: &mut Frame, area: Rect, view: &SessionView) {
        let lines = if view.phase == GamePhase::Won {
            vec![
                Line::from(""),
                Line::from(Span::styled("YOU WON", SUCCESS_STYLE)),
                Line::from("Press ENTER for the next word"),
            ]
        } else {
            vec![
                Line::from(""),
                Line::from(Span::styled("GAME OVER", ERROR_STYLE.add_modifier(Modifier::BOLD))),
                Line::from(vec![
                    Span::raw("The word was: "),
                    Span::styled(
                        view.answer.clone().unwrap_or_default(),
                        Style::new().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from("Press ENTER to restart"),
            ]
        };
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, screen: &Screen, view: Option<&SessionView>) {
        let text = match (screen, view.map(|v| v.phase)) {
            (Screen::Error { .. }, _) => "Press any key to exit",
            (Screen::Loading { .. }, _) => "ESC: Quit",
            (Screen::Board, Some(GamePhase::Won)) => "ENTER: Next word | ESC: Quit",
            (Screen::Board, Some(GamePhase::Lost)) => "ENTER: Restart | ESC: Quit",
            (Screen::Board, _) => "A-Z/0-9: Guess | TAB: Tricky hint | ESC: Quit",
        };
        let paragraph = Paragraph::new(text)
            .style(Style::new().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let paragraph = Paragraph::new(status.to_string())
            .style(MESSAGE_STYLE)
            .block(Block::default().title("Status").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    /// Poll for one key press; `Ok(None)` on timeout or ignored events.
    fn handle_input(&mut self) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(map_key(key)),
            Event::Resize(_, _) => {
                self.draw_or_log();
                Ok(None)
            }
            other => {
                debug_log!("handle_input() - Ignoring event: {:?}", other);
                Ok(None)
            }
        }
    }

    /// Block until any key is pressed.
    fn wait_for_key(&mut self) {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => return,
                Ok(_) => {}
                Err(e) => {
                    debug_log!("wait_for_key() - Input error: {}", e);
                    return;
                }
            }
        }
    }
}

/// Maps a key event to an action; modifier chords are ignored.
fn map_key(key: KeyEvent) -> Option<UserAction> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(UserAction::Exit)
            }
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(UserAction::Exit),
        KeyCode::Enter => Some(UserAction::Advance),
        KeyCode::Tab => Some(UserAction::Hint),
        KeyCode::Char(c) => normalize_key(c).map(UserAction::Guess),
        _ => None,
    }
}

impl GameInterface for TuiInterface {
    fn display_loading(&mut self, level: usize) {
        self.screen = Screen::Loading { level };
        self.hint.clear();
        self.message.clear();
        self.status = format!("Generating words for level {level}...");
        self.draw_or_log();
    }

    fn display_session(&mut self, view: &SessionView) {
        if self.view.as_ref().map(|v| (v.level, v.streak)) != Some((view.level, view.streak))
            || self.screen != Screen::Board
        {
            self.hint.clear();
        }
        self.screen = Screen::Board;
        self.status = match view.phase {
            GamePhase::Won => format!("Solved: {}", view.reveal),
            GamePhase::Lost => "Out of lives".to_string(),
            GamePhase::Playing | GamePhase::Waiting => {
                format!("{} lives left", view.lives)
            }
        };
        self.view = Some(view.clone());
        self.draw_or_log();
    }

    fn read_action(&mut self) -> Option<UserAction> {
        match self.handle_input() {
            Ok(Some(action)) => {
                info_log!("read_action() - Action received: {:?}", action);
                self.message.clear();
                Some(action)
            }
            Ok(None) => None,
            Err(e) => {
                debug_log!("read_action() - Error handling input: {}", e);
                Some(UserAction::Exit)
            }
        }
    }

    fn display_hint(&mut self, hint: &str) {
        self.hint = hint.to_string();
        self.draw_or_log();
    }

    fn display_message(&mut self, message: &str) {
        self.message = message.to_string();
        self.draw_or_log();
    }

    fn display_error(&mut self, error: &SessionError) {
        self.screen = Screen::Error {
            message: error.to_string(),
        };
        self.status = "Error".to_string();
        self.draw_or_log();
        self.wait_for_key();
    }

    fn display_exit_message(&mut self) {
        self.status = "Exiting application...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
