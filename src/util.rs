// util.rs

use std::io::{self, Write};

use crate::history::HistoryEntry;

/// Write `s` plus `eol`, treating a closed pipe as success.
pub fn write_ignore_broken_pipe<W: Write>(mut w: W, s: &str, eol: &str) -> io::Result<()> {
    let result = write!(w, "{}{}", s, eol).and_then(|_| w.flush());
    match result {
        Err(ref e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Numbered history lines, index 0 first.
pub fn history_lines(items: &[HistoryEntry]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{:>3}  {}", i, entry))
        .collect()
}
