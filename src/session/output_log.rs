// Output log - ordered record of rendered lines
//
// Lines are appended at the end and never edited. When a scrollback limit
// is set the oldest lines are dropped first. Appending snaps the viewport
// back to the bottom; `clear` wipes everything and bumps the generation so
// views know to redraw from scratch.

use std::collections::VecDeque;

use crate::render::OutputLine;

#[derive(Debug, Clone)]
pub struct OutputLog {
    lines: VecDeque<OutputLine>,
    /// Maximum retained lines, 0 for unbounded
    limit: usize,
    /// Lines scrolled up from the bottom
    scroll_offset: usize,
    generation: u64,
}

impl OutputLog {
    pub fn new(limit: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            limit,
            scroll_offset: 0,
            generation: 0,
        }
    }

    pub fn append(&mut self, line: OutputLine) {
        if self.limit > 0 && self.lines.len() >= self.limit {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        self.scroll_to_bottom();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll_offset = 0;
        self.generation += 1;
    }

    pub fn lines(&self) -> impl Iterator<Item = &OutputLine> {
        self.lines.iter()
    }

    pub fn last(&self) -> Option<&OutputLine> {
        self.lines.back()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Incremented on every clear
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Move the viewport; positive scrolls back towards older lines
    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.lines.len().saturating_sub(1) as isize;
        let next = (self.scroll_offset as isize + delta).clamp(0, max);
        self.scroll_offset = next as usize;
    }
}

impl Default for OutputLog {
    fn default() -> Self {
        Self::new(crate::config::constants::DEFAULT_SCROLLBACK_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_line, LineClass, PassthroughShaper, StyleState};

    fn line(text: &str) -> OutputLine {
        render_line(text, LineClass::Stdout, StyleState::default(), &PassthroughShaper).0
    }

    #[test]
    fn test_append_keeps_order() {
        let mut log = OutputLog::new(0);
        log.append(line("a"));
        log.append(line("b"));
        let texts: Vec<String> = log.lines().map(OutputLine::text).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut log = OutputLog::new(3);
        for i in 0..5 {
            log.append(line(&format!("{}", i)));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.lines().next().map(OutputLine::text), Some("2".into()));
    }

    #[test]
    fn test_append_scrolls_to_bottom() {
        let mut log = OutputLog::new(0);
        for _ in 0..10 {
            log.append(line("x"));
        }
        log.scroll_by(4);
        assert_eq!(log.scroll_offset(), 4);
        log.append(line("y"));
        assert_eq!(log.scroll_offset(), 0);
    }

    #[test]
    fn test_scroll_clamped() {
        let mut log = OutputLog::new(0);
        log.append(line("a"));
        log.append(line("b"));
        log.scroll_by(100);
        assert_eq!(log.scroll_offset(), 1);
        log.scroll_by(-100);
        assert_eq!(log.scroll_offset(), 0);
    }

    #[test]
    fn test_clear_bumps_generation() {
        let mut log = OutputLog::new(0);
        log.append(line("a"));
        let before = log.generation();
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.generation(), before + 1);
    }
}
