//! Query history and recall navigation
//!
//! [`HistoryLog`] is the append-only list of statements submitted in this
//! session. [`Navigator`] walks it with a cursor:
//!
//! ```text
//!            recall_previous (history non-empty, stash buffer)
//!   Live  ───────────────────────────────────────────────▶  Browsing(len-1)
//!    ▲                                                          │  ▲
//!    │ recall_next at len-1 (restore stash)     recall_previous │  │ recall_next
//!    └──────────────────────────────────────────────────────────┘  ▼
//!                                                           Browsing(k-1) ...
//! ```
//!
//! Committing a statement from any state appends it to the log, clears the
//! buffer and the stash, and returns to `Live`. [`QueryEditor`] ties the
//! edit buffer, the log and the navigator together.

/// Append-only log of submitted statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<String>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: impl Into<String>) {
        self.entries.push(statement.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// Where the navigator's cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    /// Not browsing; the live edit buffer is authoritative
    #[default]
    Live,
    /// Viewing the history entry at this index
    Browsing(usize),
}

impl NavState {
    /// Cursor as an index, with `-1` for `Live`
    pub fn cursor(&self) -> isize {
        match self {
            NavState::Live => -1,
            NavState::Browsing(k) => *k as isize,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, NavState::Live)
    }
}

/// Cursor and stash over a [`HistoryLog`].
///
/// The stash only holds a value while browsing; every transition to `Live`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    state: NavState,
    stash: Option<String>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn stash(&self) -> Option<&str> {
        self.stash.as_deref()
    }

    /// Step towards older entries.
    ///
    /// Returns the text the edit buffer should now hold, or `None` when
    /// nothing changes (empty history, or already at the oldest entry).
    pub fn recall_previous(&mut self, log: &HistoryLog, buffer: &str) -> Option<String> {
        let target = match self.state {
            NavState::Live if log.is_empty() => return None,
            NavState::Live => {
                self.stash = Some(buffer.to_string());
                log.len() - 1
            }
            NavState::Browsing(0) => return None,
            NavState::Browsing(k) => k - 1,
        };
        self.browse(log, target)
    }

    /// Step towards newer entries, leaving history after the newest one.
    ///
    /// Returns the text the edit buffer should now hold, or `None` when
    /// already live.
    pub fn recall_next(&mut self, log: &HistoryLog) -> Option<String> {
        match self.state {
            NavState::Live => None,
            NavState::Browsing(k) if k + 1 >= log.len() => Some(self.restore()),
            NavState::Browsing(k) => self.browse(log, k + 1),
        }
    }

    /// Return to `Live` and drop the stash
    pub fn reset(&mut self) {
        self.state = NavState::Live;
        self.stash = None;
    }

    fn browse(&mut self, log: &HistoryLog, index: usize) -> Option<String> {
        match log.get(index) {
            Some(entry) => {
                self.state = NavState::Browsing(index);
                Some(entry.to_string())
            }
            None => Some(self.restore()),
        }
    }

    fn restore(&mut self) -> String {
        let text = self.stash.take().unwrap_or_default();
        self.reset();
        text
    }
}

/// Edit buffer with history recall.
#[derive(Debug, Clone, Default)]
pub struct QueryEditor {
    buffer: String,
    history: HistoryLog,
    navigator: Navigator,
}

impl QueryEditor {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            buffer: initial.into(),
            ..Default::default()
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer with typed text. The navigator state is unchanged.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Returns true if the buffer changed
    pub fn recall_previous(&mut self) -> bool {
        match self.navigator.recall_previous(&self.history, &self.buffer) {
            Some(text) => {
                self.buffer = text;
                true
            }
            None => false,
        }
    }

    /// Returns true if the buffer changed
    pub fn recall_next(&mut self) -> bool {
        match self.navigator.recall_next(&self.history) {
            Some(text) => {
                self.buffer = text;
                true
            }
            None => false,
        }
    }

    /// Take the buffer for execution: log it, clear it, and return to `Live`.
    pub fn commit(&mut self) -> String {
        let statement = std::mem::take(&mut self.buffer);
        self.history.push(statement.clone());
        self.navigator.reset();
        statement
    }

    /// Drop the buffer without logging it and return to `Live`
    pub fn discard(&mut self) {
        self.buffer.clear();
        self.navigator.reset();
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn state(&self) -> NavState {
        self.navigator.state()
    }

    pub fn stash(&self) -> Option<&str> {
        self.navigator.stash()
    }
}
