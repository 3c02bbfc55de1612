//! Headless transcript and input.

use std::cell::RefCell;
use std::rc::Rc;

use super::{InputField, RenderedMessage, TranscriptView};

/// Rows a message container occupies besides its sections.
const CONTAINER_ROWS: usize = 1;

#[derive(Debug, Default)]
struct TranscriptState {
    messages: Vec<RenderedMessage>,
    scroll_top: usize,
    scroll_height: usize,
}

/// In-memory [`TranscriptView`].
///
/// Keeps the appended messages and models scrolling in text rows: every
/// container adds one row plus the line count of each section. Clones share
/// the same transcript.
#[derive(Debug, Clone, Default)]
pub struct MemoryTranscript {
    state: Rc<RefCell<TranscriptState>>,
}

impl MemoryTranscript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<RenderedMessage> {
        self.state.borrow().messages.clone()
    }

    /// The most recent message.
    #[must_use]
    pub fn last(&self) -> Option<RenderedMessage> {
        self.state.borrow().messages.last().cloned()
    }

    /// Number of message containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().messages.len()
    }

    /// Whether nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current scroll offset, in rows.
    #[must_use]
    pub fn scroll_top(&self) -> usize {
        self.state.borrow().scroll_top
    }

    /// Total content height, in rows.
    #[must_use]
    pub fn scroll_height(&self) -> usize {
        self.state.borrow().scroll_height
    }

    /// Whether the view shows the most recent message.
    #[must_use]
    pub fn is_scrolled_to_bottom(&self) -> bool {
        let state = self.state.borrow();
        state.scroll_top == state.scroll_height
    }
}

impl TranscriptView for MemoryTranscript {
    fn append(&self, message: &RenderedMessage) {
        let rows = CONTAINER_ROWS
            + message
                .sections
                .iter()
                .map(|section| section.lines().count().max(1))
                .sum::<usize>();

        let mut state = self.state.borrow_mut();
        state.scroll_height += rows;
        state.messages.push(message.clone());
    }

    fn scroll_to_bottom(&self) {
        let mut state = self.state.borrow_mut();
        state.scroll_top = state.scroll_height;
    }
}

/// In-memory [`InputField`]. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
    value: Rc<RefCell<String>>,
}

impl MemoryInput {
    /// Create an empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value, as if the user had typed it.
    pub fn set(&self, value: &str) {
        value.clone_into(&mut self.value.borrow_mut());
    }
}

impl InputField for MemoryInput {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn clear(&self) {
        self.value.borrow_mut().clear();
    }
}
