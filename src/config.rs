// src/config.rs
//
// Shell settings, read from `$JOBSH_CONFIG` or `~/.jobshrc.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "JOBSH_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Print `<cwd> $ ` before each read.
    pub prompt: bool,
    /// How long the foreground wait sleeps between checks.
    pub poll_interval_ms: u64,
    /// Use the line editor when standard input is a terminal.
    pub line_editor: bool,
    pub history_file: Option<PathBuf>,
    pub history_size: usize,
    /// Print `[jid] (pid)` after launching a background job.
    pub announce_background: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: !cfg!(feature = "no-prompt"),
            poll_interval_ms: 1000,
            line_editor: true,
            history_file: None,
            history_size: 1000,
            announce_background: true,
        }
    }
}

impl Config {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                tracing::debug!("no config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("failed to load {}", path.display()))?;
        tracing::debug!(?config, "loaded {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.poll_interval_ms = config.poll_interval_ms.max(1);
        Ok(config)
    }

    pub fn path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".jobshrc.toml"))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".jobsh_history")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn defaults_match_the_coarse_poll() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(config.announce_background);
    }

    #[test]
    fn keys_override_defaults() {
        let config = Config::from_toml(
            r#"
            prompt = false
            poll_interval_ms = 20
            line_editor = false
            history_file = "/tmp/jobsh-history"
            "#,
        )
        .unwrap();
        assert!(!config.prompt);
        assert_eq!(config.poll_interval(), Duration::from_millis(20));
        assert!(!config.line_editor);
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/jobsh-history")));
        assert_eq!(config.history_size, 1000);
    }

    #[test]
    fn zero_interval_is_raised_to_one_millisecond() {
        let config = Config::from_toml("poll_interval_ms = 0").unwrap();
        assert_eq!(config.poll_interval_ms, 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("colour = true").is_err());
    }

    #[test]
    fn load_from_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "prompt = 3").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad.toml"));
    }
}
