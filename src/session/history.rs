// Command history with draft preservation
//
// Up walks towards older entries, Down towards newer ones. The line being
// typed when browsing starts is kept as a draft and restored when Down
// moves past the newest entry.

use std::path::Path;

use crate::config::constants::MAX_HISTORY_ENTRIES;

#[derive(Debug, Default, Clone)]
pub struct CommandHistory {
    entries: Vec<String>,
    index: Option<usize>,
    draft: Option<String>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Record a submitted command and stop browsing
    pub fn push(&mut self, command: &str) {
        self.index = None;
        self.draft = None;
        if command.trim().is_empty() {
            return;
        }
        if self.entries.last().map(String::as_str) != Some(command) {
            self.entries.push(command.to_string());
        }
    }

    /// Step to an older entry; `current` is the live line
    pub fn previous(&mut self, current: &str) -> Option<&str> {
        let next = match self.index {
            Some(0) => return None,
            Some(i) => i - 1,
            None => {
                if self.entries.is_empty() {
                    return None;
                }
                self.draft = Some(current.to_string());
                self.entries.len() - 1
            }
        };
        self.index = Some(next);
        self.entries.get(next).map(String::as_str)
    }

    /// Step to a newer entry, or back to the draft past the newest
    pub fn next(&mut self) -> Option<String> {
        let i = self.index?;
        if i + 1 < self.entries.len() {
            self.index = Some(i + 1);
            self.entries.get(i + 1).cloned()
        } else {
            self.index = None;
            Some(self.draft.take().unwrap_or_default())
        }
    }

    /// Read one command per line; a missing or unreadable file gives an empty history
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("cannot read history {}: {}", path.display(), e);
                }
                String::new()
            }
        };
        let entries = contents
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        let skip = entries.len().saturating_sub(MAX_HISTORY_ENTRIES);
        Self::with_entries(entries.into_iter().skip(skip).collect())
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let skip = self.entries.len().saturating_sub(MAX_HISTORY_ENTRIES);
        let content: String = self
            .entries
            .iter()
            .skip(skip)
            .map(|l| format!("{}\n", l))
            .collect();
        std::fs::write(path, content)
    }
}
