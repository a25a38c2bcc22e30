// Single-line edit buffer for the prompt
//
// Text is held as characters so the cursor is a character offset and can
// never land inside a multi-byte sequence. Once locked (the process exited)
// every mutation except `clear` is ignored.

use std::fmt;

use crate::render::shape::{shape_or_original, Shaper};

/// Character span of the word under the cursor, `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Default, Clone)]
pub struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
    locked: bool,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Refuse further edits
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn insert(&mut self, text: &str) {
        if self.locked || text.is_empty() {
            return;
        }
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.chars.splice(self.cursor..self.cursor, inserted);
        self.cursor += count;
    }

    pub fn backspace(&mut self) {
        if self.locked || self.cursor == 0 {
            return;
        }
        self.chars.remove(self.cursor - 1);
        self.cursor -= 1;
    }

    pub fn delete_forward(&mut self) {
        if self.locked || self.cursor >= self.chars.len() {
            return;
        }
        self.chars.remove(self.cursor);
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, self.chars.len() as isize) as usize;
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Replace the whole line, cursor at the end
    pub fn set_text(&mut self, text: &str) {
        if self.locked {
            return;
        }
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Span of the space-delimited word touching the cursor
    pub fn word_bounds_at_cursor(&self) -> WordSpan {
        let start = self.chars[..self.cursor]
            .iter()
            .rposition(|&c| c == ' ')
            .map_or(0, |i| i + 1);
        let end = self.chars[self.cursor..]
            .iter()
            .position(|&c| c == ' ')
            .map_or(self.chars.len(), |i| self.cursor + i);
        WordSpan { start, end }
    }

    /// Text covered by `span`
    pub fn slice(&self, span: WordSpan) -> String {
        let end = span.end.min(self.chars.len());
        let start = span.start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Replace the word under the cursor and move the cursor after it
    pub fn replace_word(&mut self, replacement: &str) {
        if self.locked {
            return;
        }
        let span = self.word_bounds_at_cursor();
        let inserted: Vec<char> = replacement.chars().collect();
        let count = inserted.len();
        self.chars.splice(span.start..span.end, inserted);
        self.cursor = span.start + count;
    }

    /// Shape the line and split it at the cursor for display
    pub fn render(&self, shaper: &dyn Shaper) -> PromptView {
        let shaped: Vec<char> = shape_or_original(shaper, &self.text()).chars().collect();
        let split = self.cursor.min(shaped.len());
        PromptView {
            before: shaped[..split].iter().collect(),
            after: shaped[split..].iter().collect(),
        }
    }
}

/// The visible prompt: shaped text split around the caret
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptView {
    pub before: String,
    pub after: String,
}

impl PromptView {
    /// Join both halves with `caret` in between
    pub fn with_caret(&self, caret: &str) -> String {
        format!("{}{}{}", self.before, caret, self.after)
    }
}

impl fmt::Display for PromptView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.before, self.after)
    }
}
