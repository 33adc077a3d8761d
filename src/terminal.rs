// terminal.rs

use std::io::Write;
use std::os::unix::io::RawFd;

use itertools::Itertools;
use nix::sys::termios::{self, SetArg, Termios};

use crate::history::HistoryEntry;
use crate::render::Render;
use crate::token::Operation;
use crate::util::{history_lines, write_ignore_broken_pipe};

const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub fn is_tty(fd: RawFd) -> bool {
    nix::unistd::isatty(fd).unwrap_or(false)
}

/// Puts a terminal into raw mode until dropped.
pub struct RawMode {
    fd: RawFd,
    original: Termios,
}

impl RawMode {
    pub fn enable(fd: RawFd) -> nix::Result<Self> {
        let original = termios::tcgetattr(fd)?;
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(fd, SetArg::TCSANOW, &raw)?;
        Ok(Self { fd, original })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = termios::tcsetattr(self.fd, SetArg::TCSANOW, &self.original);
    }
}

fn operation_legend() -> String {
    Operation::ALL
        .iter()
        .map(|op| format!("{}:{}", op.key(), op))
        .join("  ")
}

/// Full-screen renderer for the keypad front end. Redraws the whole frame
/// on flush; lines end in `\r\n` because output post-processing is off in
/// raw mode.
pub struct KeypadRenderer<W> {
    out: W,
    display: String,
    error: bool,
    history: Vec<HistoryEntry>,
    scientific: bool,
    dirty: bool,
}

impl<W: Write> KeypadRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            display: String::new(),
            error: false,
            history: Vec::new(),
            scientific: false,
            dirty: true,
        }
    }

    fn frame(&self) -> Vec<String> {
        let mode = if self.scientific { "scientific" } else { "basic" };
        let mut lines = vec![format!("keycalc [{mode}]"), String::new()];
        if self.error {
            lines.push(format!("  {RED}{}{RESET}", self.display));
        } else {
            lines.push(format!("  {}", self.display));
        }
        lines.push(String::new());
        if self.scientific {
            lines.push(operation_legend());
            lines.push(String::new());
        }
        lines.push("history".to_string());
        lines.extend(history_lines(&self.history));
        lines.push(String::new());
        lines.push(format!(
            "{DIM}=/enter submit  c/esc clear  backspace delete  s mode  p π  e e  r<n> recall  ^C quit{RESET}"
        ));
        lines
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Render for KeypadRenderer<W> {
    fn set_display_text(&mut self, text: &str) {
        self.display = text.to_string();
        self.dirty = true;
    }
    fn set_error(&mut self, active: bool) {
        self.error = active;
        self.dirty = true;
    }
    fn set_history_items(&mut self, items: &[HistoryEntry]) {
        self.history = items.to_vec();
        self.dirty = true;
    }
    fn set_scientific_visible(&mut self, visible: bool) {
        self.scientific = visible;
        self.dirty = true;
    }
    fn show_history(&mut self) {
        // always on screen
        self.dirty = true;
    }
    fn flush(&mut self) {
        if !std::mem::take(&mut self.dirty) {
            return;
        }
        let frame = format!("{CLEAR_SCREEN}{}", self.frame().join("\r\n"));
        let _ = write_ignore_broken_pipe(&mut self.out, &frame, "\r\n");
    }
}

/// Renderer for the line front end: prints what changed since the last
/// line was entered.
pub struct LineRenderer<W> {
    out: W,
    color: bool,
    display: String,
    error: bool,
    dirty: bool,
    scientific: Option<bool>,
    history: Vec<HistoryEntry>,
    history_requested: bool,
}

impl<W: Write> LineRenderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            display: String::new(),
            error: false,
            dirty: false,
            scientific: None,
            history: Vec::new(),
            history_requested: false,
        }
    }

    fn print(&mut self, line: &str) {
        let _ = write_ignore_broken_pipe(&mut self.out, line, "\n");
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Render for LineRenderer<W> {
    fn set_display_text(&mut self, text: &str) {
        self.display = text.to_string();
        self.dirty = true;
    }
    fn set_error(&mut self, active: bool) {
        self.error = active;
    }
    fn set_history_items(&mut self, items: &[HistoryEntry]) {
        self.history = items.to_vec();
    }
    fn set_scientific_visible(&mut self, visible: bool) {
        self.scientific = Some(visible);
    }
    fn show_history(&mut self) {
        self.history_requested = true;
    }
    fn flush(&mut self) {
        if let Some(visible) = self.scientific.take() {
            let line = if visible {
                format!("scientific mode: {}", Operation::ALL.iter().map(|op| op.name()).join(" "))
            } else {
                "basic mode".to_string()
            };
            self.print(&line);
        }
        if std::mem::take(&mut self.dirty) && !self.display.is_empty() {
            let line = match (self.error, self.color) {
                (true, true) => format!("{RED}error: {}{RESET}", self.display),
                (true, false) => format!("error: {}", self.display),
                (false, _) => format!("  {}", self.display),
            };
            self.print(&line);
        }
        if std::mem::take(&mut self.history_requested) {
            let lines = history_lines(&self.history);
            if lines.is_empty() {
                self.print("  (no history)");
            } else {
                self.print(&lines.join("\n"));
            }
        }
    }
}
