// Project-wide constants
//
// Defaults that more than one module reads. Import via
// `use crate::config::constants::*;`.

/// Echo prefix for submitted commands.
pub const DEFAULT_PROMPT_PREFIX: &str = "PS> ";

/// Prefix of the working-directory line.
pub const DEFAULT_CWD_PREFIX: &str = "📁 ";

/// Glyph drawn between the two halves of the prompt.
pub const DEFAULT_CARET: &str = "▏";

/// Lines kept in the output log before the oldest are dropped.
pub const DEFAULT_SCROLLBACK_LIMIT: usize = 5000;

/// Entries written back to the history file.
pub const MAX_HISTORY_ENTRIES: usize = 1000;

/// Directory under `$HOME` holding config and history.
pub const CONFIG_DIR_NAME: &str = ".rtl-shell";

pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const HISTORY_FILE_NAME: &str = "history";

/// Environment variable read by the tracing filter.
pub const LOG_ENV_VAR: &str = "RTL_SHELL_LOG";

/// Shells tried in order when none is configured.
#[cfg(windows)]
pub const DEFAULT_SHELLS: &[&str] = &["powershell.exe", "pwsh.exe", "pwsh"];

/// Shells tried in order when none is configured.
#[cfg(not(windows))]
pub const DEFAULT_SHELLS: &[&str] = &["pwsh", "powershell", "bash", "sh"];

/// Poll interval of the keyboard task.
pub const INPUT_POLL_MS: u64 = 100;

/// Redraw interval of the terminal view.
pub const RENDER_TICK_MS: u64 = 50;
