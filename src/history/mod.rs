//! Per-session command history with up/down navigation.
//!
//! [`History`] keeps at most `capacity` lines, newest at the back. Navigating
//! backwards parks the line being edited in a slot at the newest end, so an
//! unsubmitted edit survives a trip through older entries. Whatever text the
//! caller passes to [`History::previous`] overwrites the slot being left,
//! which is how edits made to recalled entries are kept while browsing.

mod storage;

pub use storage::{FileHistoryStorage, HistoryStorage, MemoryHistoryStorage};

use std::collections::VecDeque;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Not navigating; the newest entry is a submitted command.
    Inserting,
    /// Navigating; the newest entry is the in-progress edit slot.
    Browsing,
}

/// Bounded command log with a navigation cursor.
#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    /// Stored entries (newest at back).
    entries: VecDeque<String>,
    /// Navigation position (0 = newest, increases going back).
    cursor: usize,
    mode: Mode,
    /// Entries added through `new_command`; loaded ones and suppressed
    /// repeats are not counted.
    issued: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            mode: Mode::Inserting,
            issued: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All buffered entries, oldest first, including an edit slot while
    /// navigating.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Record a submitted line and stop navigating.
    pub fn new_command(&mut self, item: &str) {
        self.cursor = 0;

        if item.is_empty() {
            if self.mode == Mode::Browsing {
                self.entries.pop_back();
            }
            self.mode = Mode::Inserting;
            return;
        }

        match self.mode {
            Mode::Browsing => {
                let len = self.entries.len();
                if len > 1 && self.entries[len - 2] == item {
                    // Re-submitting the newest command: drop the edit slot.
                    self.entries.pop_back();
                } else if let Some(slot) = self.entries.back_mut() {
                    *slot = item.to_string();
                    self.issued += 1;
                }
            }
            Mode::Inserting => {
                if self.entries.back().map_or(true, |last| last != item) {
                    self.push(item);
                    self.issued += 1;
                }
            }
        }
        self.mode = Mode::Inserting;
    }

    /// Step to an older entry, saving `line` in the slot being left.
    pub fn previous(&mut self, line: &str) -> String {
        match self.mode {
            Mode::Inserting => {
                self.push(line);
                self.mode = Mode::Browsing;
                self.cursor = if self.entries.len() > 1 { 1 } else { 0 };
            }
            Mode::Browsing => {
                let idx = self.index(self.cursor);
                self.entries[idx] = line.to_string();
                if self.cursor + 1 < self.entries.len() {
                    self.cursor += 1;
                }
            }
        }
        self.entries[self.index(self.cursor)].clone()
    }

    /// Step to a newer entry; empty once back at the edit position.
    pub fn next(&mut self) -> String {
        if self.entries.is_empty() || self.cursor == 0 {
            return String::new();
        }
        self.cursor -= 1;
        self.entries[self.index(self.cursor)].clone()
    }

    /// Seed the buffer with previously persisted commands, oldest first.
    pub fn load_commands<S: AsRef<str>>(&mut self, commands: &[S]) {
        for command in commands {
            self.push(command.as_ref());
        }
    }

    /// Commands submitted in this session that are still buffered,
    /// oldest first.
    pub fn commands(&self) -> Vec<String> {
        let end = match self.mode {
            Mode::Browsing => self.entries.len().saturating_sub(1),
            Mode::Inserting => self.entries.len(),
        };
        let count = self.issued.min(end);
        self.entries.range(end - count..end).cloned().collect()
    }

    /// Print the buffer, oldest first, framed by blank lines.
    pub fn show(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        for entry in &self.entries {
            writeln!(out, "{}", entry)?;
        }
        writeln!(out)?;
        out.flush()
    }

    fn push(&mut self, item: &str) {
        self.entries.push_back(item.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    fn index(&self, cursor: usize) -> usize {
        self.entries.len() - 1 - cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, items: &[&str]) -> History {
        let mut history = History::new(capacity);
        for item in items {
            history.new_command(item);
        }
        history
    }

    #[test]
    fn test_not_full() {
        let mut history = filled(10, &["item1", "item2", "item3", "item4"]);

        assert_eq!(history.next(), "");
        assert_eq!(history.previous(""), "item4");
        assert_eq!(history.next(), "");
        assert_eq!(history.previous(""), "item4");
        assert_eq!(history.previous("item4"), "item3");
        assert_eq!(history.previous("item3"), "item2");
        assert_eq!(history.previous("item2"), "item1");
        assert_eq!(history.previous("item1"), "item1");
    }

    #[test]
    fn test_full() {
        let mut history = filled(3, &["item1", "item2", "item3", "item4"]);

        assert_eq!(history.previous(""), "item4");
        assert_eq!(history.next(), "");
        assert_eq!(history.previous(""), "item4");
        assert_eq!(history.previous("item4"), "item3");
        assert_eq!(history.previous("item3"), "item3");
        assert_eq!(history.previous("item3"), "item3");
        assert_eq!(history.next(), "item4");
        assert_eq!(history.next(), "");
    }

    #[test]
    fn test_empty() {
        let mut history = History::new(10);
        assert_eq!(history.next(), "");
        assert_eq!(history.previous(""), "");

        let mut history = History::new(10);
        assert_eq!(history.previous(""), "");
        history.new_command("item1");
        assert_eq!(history.next(), "");
        assert_eq!(history.previous(""), "item1");
    }

    #[test]
    fn test_empty_command_ends_navigation() {
        let mut history = filled(10, &["item1", "item2"]);
        assert_eq!(history.previous("draft"), "item2");
        history.new_command("");
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["item1", "item2"]);
        assert_eq!(history.commands(), vec!["item1", "item2"]);
        assert_eq!(history.previous(""), "item2");
    }

    #[test]
    fn test_repeats_do_not_expose_loaded_entries() {
        let mut history = History::new(10);
        history.load_commands(&["old1", "old2"]);
        history.new_command("old2");
        history.new_command("new");
        history.new_command("new");
        assert_eq!(history.commands(), vec!["new"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = History::new(0);
        assert_eq!(history.capacity(), 1);
        history.new_command("a");
        history.new_command("b");
        assert_eq!(history.commands(), vec!["b"]);
    }

    #[test]
    fn test_show_lists_oldest_first() {
        let history = filled(10, &["one", "two"]);
        let mut out = Vec::new();
        history.show(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\none\ntwo\n\n");
    }
}
