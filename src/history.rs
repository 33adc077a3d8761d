// history.rs

use std::fmt;

pub const HISTORY_CAPACITY: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    expression: String,
    result: String,
}

impl HistoryEntry {
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
        }
    }
    pub fn expression(&self) -> &str {
        &self.expression
    }
    pub fn result(&self) -> &str {
        &self.result
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.expression, self.result)
    }
}

/// Recent calculations, newest first.
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self { entries: Vec::with_capacity(HISTORY_CAPACITY + 1) }
    }
    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }
    pub fn get(&self, n: usize) -> Option<&HistoryEntry> {
        self.entries.get(n)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut history = History::new();
        history.add(HistoryEntry::new("1+1", "2"));
        history.add(HistoryEntry::new("2+2", "4"));
        assert_eq!(history.get(0).unwrap().expression(), "2+2");
        assert_eq!(history.get(1).unwrap().result(), "2");
        assert!(history.get(2).is_none());
    }

    #[test]
    fn test_eleventh_entry_evicts_oldest() {
        let mut history = History::new();
        for i in 0..11 {
            history.add(HistoryEntry::new(format!("{i}+0"), i.to_string()));
            assert!(history.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        let results: Vec<&str> = history.all().iter().map(|e| e.result()).collect();
        assert_eq!(results, ["10", "9", "8", "7", "6", "5", "4", "3", "2", "1"]);
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(HistoryEntry::new("2+3", "5").to_string(), "2+3 = 5");
    }
}
