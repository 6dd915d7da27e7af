//! Terminal rendering of session events.
//!
//! Story text goes to stdout. While narration plays, a single status line
//! shows a window of words around the highlighted one and is redrawn in
//! place.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use indicatif::{ProgressBar, ProgressStyle};
use storyloom_core::{PlaybackStatus, Turn, TurnKind, count_words};
use storyloom_session::{Highlight, SessionEvent, SessionState};

/// Words shown on each side of the highlighted word.
const HIGHLIGHT_RADIUS: usize = 6;

/// Words around `index` in `text`, split into (before, word, after).
///
/// Returns `None` when `index` is past the last word.
pub fn highlight_window(
    text: &str,
    index: usize,
    radius: usize,
) -> Option<(String, String, String)> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word = (*words.get(index)?).to_string();
    let start = index.saturating_sub(radius);
    let end = (index + radius + 1).min(words.len());

    let mut before = words[start..index].join(" ");
    if start > 0 {
        before.insert_str(0, "… ");
    }
    let mut after = words[index + 1..end].join(" ");
    if end < words.len() {
        after.push_str(" …");
    }
    Some((before, word, after))
}

/// Heading printed above a turn.
pub fn turn_heading(turn: &Turn) -> String {
    match turn.kind() {
        TurnKind::Story if turn.narrated() => format!("── Story · turn {} ──", turn.index() + 1),
        TurnKind::Story => format!("── Story · turn {} (text only) ──", turn.index() + 1),
        TurnKind::User => format!("── You · turn {} ──", turn.index() + 1),
    }
}

/// Line printed after a generated turn while improvisations remain.
pub fn improvisation_prompt(remaining: u8, waiting_for_input: bool) -> Option<String> {
    let left = match remaining {
        0 => return None,
        1 => "1 improvisation left".to_string(),
        n => format!("{n} improvisations left"),
    };
    Some(if waiting_for_input {
        format!("What happens next? ({left})")
    } else {
        format!("({left})")
    })
}

/// Renders events as they arrive.
pub struct Renderer {
    turns: Vec<Turn>,
    spinner: Option<ProgressBar>,
    /// Whether the in-place highlight line is currently drawn.
    status_line: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub const fn new() -> Self {
        Self {
            turns: Vec::new(),
            spinner: None,
            status_line: false,
        }
    }

    pub fn render(&mut self, event: &SessionEvent) -> io::Result<()> {
        match event {
            SessionEvent::StateChanged(state) => self.on_state(*state),
            SessionEvent::TextProgress(text) => {
                if let Some(spinner) = &self.spinner {
                    spinner.set_message(format!("Writing… {} words", count_words(text)));
                }
                Ok(())
            }
            SessionEvent::TurnAppended(turn) => {
                self.finish_spinner();
                self.clear_status()?;
                if turn.kind() == TurnKind::Story {
                    println!();
                    println!("{}", turn_heading(turn).bold());
                    println!("{}", turn.text());
                    println!();
                }
                self.turns.push(turn.clone());
                Ok(())
            }
            SessionEvent::Highlight(highlight) => self.on_highlight(*highlight),
            SessionEvent::PlaybackChanged(playback) => {
                if matches!(playback.status, PlaybackStatus::Ended | PlaybackStatus::Failed) {
                    self.clear_status()?;
                }
                Ok(())
            }
            SessionEvent::Completed => {
                self.clear_status()?;
                println!("{}", "The story is complete. No improvisations left.".italic());
                Ok(())
            }
            SessionEvent::Error(message) => {
                self.finish_spinner();
                self.clear_status()?;
                // Opening failures are reported by the command result.
                if !self.turns.is_empty() {
                    eprintln!("{} {message}", "error:".red().bold());
                }
                Ok(())
            }
        }
    }

    fn on_state(&mut self, state: SessionState) -> io::Result<()> {
        match state {
            SessionState::Generating => {
                let spinner = ProgressBar::new_spinner();
                let style = ProgressStyle::default_spinner().template("{spinner:.green} {msg}");
                if let Ok(style) = style {
                    spinner.set_style(style);
                }
                spinner.set_message("Writing…");
                spinner.enable_steady_tick(Duration::from_millis(100));
                self.spinner = Some(spinner);
            }
            SessionState::PreparingAudio => {
                if let Some(spinner) = &self.spinner {
                    spinner.set_message("Preparing narration…");
                }
            }
            SessionState::Paused => {
                self.clear_status()?;
                println!("{}", "(paused, /resume to continue)".dim());
            }
            SessionState::Aborted => {
                self.finish_spinner();
                self.clear_status()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_highlight(&mut self, highlight: Highlight) -> io::Result<()> {
        let Some(index) = highlight.word else {
            return self.clear_status();
        };
        let Some(turn) = self.turns.iter().find(|t| t.index() == highlight.turn) else {
            return Ok(());
        };
        let Some((before, word, after)) = highlight_window(turn.text(), index, HIGHLIGHT_RADIUS)
        else {
            return Ok(());
        };

        let mut out = io::stdout().lock();
        crossterm::queue!(out, Clear(ClearType::CurrentLine))?;
        write!(out, "\r{before} {} {after}", word.reverse())?;
        out.flush()?;
        self.status_line = true;
        Ok(())
    }

    fn clear_status(&mut self) -> io::Result<()> {
        if !self.status_line {
            return Ok(());
        }
        let mut out = io::stdout().lock();
        crossterm::queue!(out, Clear(ClearType::CurrentLine))?;
        writeln!(out, "\r")?;
        out.flush()?;
        self.status_line = false;
        Ok(())
    }

    fn finish_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
