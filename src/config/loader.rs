// Configuration loader
// Loads ~/.rtl-shell/config.toml, or the file given with --config

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, HISTORY_FILE_NAME};
use super::settings::Config;

/// `~/.rtl-shell`
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(CONFIG_DIR_NAME))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

pub fn history_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(HISTORY_FILE_NAME))
}

/// Load configuration
///
/// An explicit path must exist. The default location falls back to
/// built-in defaults when the file is missing.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_from(path),
        None => {
            let path = default_config_path()?;
            if !path.exists() {
                tracing::debug!("no config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            load_from(&path)
        }
    }
}

fn load_from(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorSpec;
    use tempfile::TempDir;

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "caret = \"|\"\n[colors]\nstatus = \"white\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.caret, "|");
        assert_eq!(config.colors.status, ColorSpec::Named("white".into()));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "scrollback_limit = \"lots\"").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("bad.toml"));
    }
}
