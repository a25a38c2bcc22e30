// Configuration structs

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::colors::ColorScheme;
use super::constants::*;
use crate::render::ShapingMode;

/// Contents of `~/.rtl-shell/config.toml`; every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix of echoed commands
    pub prompt_prefix: String,

    /// Prefix of the working-directory line
    pub cwd_prefix: String,

    /// Caret glyph drawn inside the prompt
    pub caret: String,

    /// Shell executables tried in order (empty = platform default)
    pub shells: Vec<String>,

    /// Maximum lines kept in the output log (0 = unbounded)
    pub scrollback_limit: usize,

    /// Text shaping applied to output and the prompt
    pub shaping: ShapingMode,

    pub colors: ColorScheme,

    /// Tracing output file; the TUI logs nowhere without one
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt_prefix: DEFAULT_PROMPT_PREFIX.to_string(),
            cwd_prefix: DEFAULT_CWD_PREFIX.to_string(),
            caret: DEFAULT_CARET.to_string(),
            shells: Vec::new(),
            scrollback_limit: DEFAULT_SCROLLBACK_LIMIT,
            shaping: ShapingMode::default(),
            colors: ColorScheme::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Configured shells, or the platform defaults when none are set
    pub fn shell_candidates(&self) -> Vec<String> {
        if self.shells.is_empty() {
            DEFAULT_SHELLS.iter().map(|s| s.to_string()).collect()
        } else {
            self.shells.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.prompt_prefix, "PS> ");
        assert_eq!(config.scrollback_limit, 5000);
    }

    #[test]
    fn test_overrides() {
        let config: Config = toml::from_str(
            r#"
            prompt_prefix = "$ "
            shells = ["zsh"]
            shaping = "none"
            scrollback_limit = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.prompt_prefix, "$ ");
        assert_eq!(config.shaping, ShapingMode::None);
        assert_eq!(config.shell_candidates(), vec!["zsh".to_string()]);
        assert_eq!(config.cwd_prefix, DEFAULT_CWD_PREFIX);
    }

    #[test]
    fn test_reorder_only_shaping() {
        let config: Config = toml::from_str(r#"shaping = "reorder""#).unwrap();
        assert_eq!(config.shaping, ShapingMode::Reorder);
    }

    #[test]
    fn test_default_shells() {
        let config = Config::default();
        assert_eq!(config.shell_candidates().len(), DEFAULT_SHELLS.len());
    }
}
