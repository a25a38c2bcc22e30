// Working-directory tracking for the host shell
//
// The shell is a plain child process, so its directory cannot be queried.
// Instead, submitted lines that look like `cd <dir>` or
// `Set-Location <dir>` are resolved against the tracked directory and
// adopted when they name an existing directory.

use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

static CD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^cd\s+(.+)$").expect("static cd regex"));

static SET_LOCATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^set-location\s+(.+)$").expect("static set-location regex"));

/// Remove one leading and one trailing quote character
pub fn strip_quotes(text: &str) -> &str {
    let text = text
        .strip_prefix(|c| c == '"' || c == '\'')
        .unwrap_or(text);
    text.strip_suffix(|c| c == '"' || c == '\'').unwrap_or(text)
}

/// Directory argument of a `cd`/`Set-Location` command, if the line is one
pub fn cd_target(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    CD_PATTERN
        .captures(trimmed)
        .or_else(|| SET_LOCATION_PATTERN.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Resolve `target` against `cwd`; `None` unless it is an existing directory
pub fn resolve_dir(target: &str, cwd: &Path) -> Option<PathBuf> {
    let resolved = normalize(&cwd.join(strip_quotes(target)));
    match std::fs::metadata(&resolved) {
        Ok(meta) if meta.is_dir() => Some(resolved),
        _ => None,
    }
}

/// Lexically fold `.` and `..` components without touching the filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Tracked directory of the host shell
#[derive(Debug, Clone)]
pub struct CwdTracker {
    current: PathBuf,
}

impl CwdTracker {
    pub fn new(initial: PathBuf) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Inspect a submitted line; returns the new directory when it changed
    pub fn observe(&mut self, input: &str) -> Option<&Path> {
        let target = cd_target(input)?;
        let resolved = resolve_dir(target, &self.current)?;
        tracing::debug!("cwd -> {}", resolved.display());
        self.current = resolved;
        Some(&self.current)
    }
}
