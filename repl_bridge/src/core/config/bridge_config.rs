// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{path::{Path, PathBuf},
          time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConfigError, try_get_config_file_path};

pub const DEFAULT_REPL_BUFFER_NAME: &str = "*scheme*";
pub const DEFAULT_PROCESS_KIND: &str = "##repl-debug-main";
pub const DEFAULT_SPLIT_PERCENT: u16 = 33;
pub const DEFAULT_INTERPRETER_COMMAND: &str = "gsi";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Settings for a [`crate::ReplSession`] and the `rbridge` binary. Every field has a
/// default, so an empty JSON object (or no file at all) is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name of the buffer bound to the interpreter.
    pub repl_buffer_name: String,
    /// The process kind passed to [`crate::ReplSession::make`] for the REPL buffer.
    pub process_kind: String,
    /// Height of the REPL pane, as a percentage of the frame that gets split.
    pub split_percent: u16,
    pub interpreter: InterpreterConfig,
    pub log: LogConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            repl_buffer_name: DEFAULT_REPL_BUFFER_NAME.to_string(),
            process_kind: DEFAULT_PROCESS_KIND.to_string(),
            split_percent: DEFAULT_SPLIT_PERCENT,
            interpreter: InterpreterConfig::default(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Leave the pseudo terminal's echo on. Off by default, since the editor already
    /// shows what was typed.
    pub echo: bool,
    pub poll_interval_ms: u64,
    pub rows: u16,
    pub cols: u16,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_INTERPRETER_COMMAND.to_string(),
            args: vec![],
            cwd: None,
            echo: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            rows: 24,
            cols: 80,
        }
    }
}

impl InterpreterConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration { Duration::from_millis(self.poll_interval_ms) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
            file: crate::tracing_config_options::DEFAULT_LOG_FILE_NAME.to_string(),
        }
    }
}

impl LogConfig {
    /// Falls back to [`tracing_core::LevelFilter::DEBUG`] for an unrecognized level.
    #[must_use]
    pub fn level_filter(&self) -> tracing_core::LevelFilter {
        if !self.enabled {
            return tracing_core::LevelFilter::OFF;
        }
        self.level
            .parse::<tracing_core::LevelFilter>()
            .unwrap_or(tracing_core::LevelFilter::DEBUG)
    }
}

impl BridgeConfig {
    /// Parse the JSON config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file can't be read, and
    /// [`ConfigError::Parse`] if it isn't valid JSON for this struct.
    pub fn try_load(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let it = serde_json::from_str::<Self>(&content).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(?path, "loaded config");
        Ok(it)
    }

    /// Load from `maybe_path` if given. Otherwise look in the config folder (see
    /// [`try_get_config_file_path`]), and use the defaults if there is no file there.
    ///
    /// # Errors
    ///
    /// An explicitly given path must exist. A file that does exist must parse.
    pub fn try_load_or_default(maybe_path: Option<&Path>) -> miette::Result<Self> {
        if let Some(path) = maybe_path {
            return Self::try_load(path);
        }

        match try_get_config_file_path() {
            Some(path) if path.exists() => Self::try_load(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let it: BridgeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(it, BridgeConfig::default());
        assert_eq!(it.repl_buffer_name, "*scheme*");
        assert_eq!(it.process_kind, "##repl-debug-main");
        assert_eq!(it.split_percent, 33);
        assert_eq!(it.interpreter.command, "gsi");
        assert_eq!(it.interpreter.poll_interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_partial_interpreter_section() {
        let it: BridgeConfig = serde_json::from_str(
            r#"{ "interpreter": { "command": "guile", "args": ["-q"] }, "split_percent": 50 }"#,
        )
        .unwrap();
        assert_eq!(it.interpreter.command, "guile");
        assert_eq!(it.interpreter.args, vec!["-q".to_string()]);
        assert_eq!(it.interpreter.rows, 24);
        assert_eq!(it.split_percent, 50);
        assert_eq!(it.repl_buffer_name, DEFAULT_REPL_BUFFER_NAME);
    }

    #[test]
    fn test_log_level_filter() {
        let mut log = LogConfig::default();
        assert_eq!(log.level_filter(), tracing_core::LevelFilter::OFF);

        log.enabled = true;
        log.level = "warn".into();
        assert_eq!(log.level_filter(), tracing_core::LevelFilter::WARN);

        log.level = "chatty".into();
        assert_eq!(log.level_filter(), tracing_core::LevelFilter::DEBUG);
    }

    #[test]
    fn test_try_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "repl_buffer_name": "*repl*" }"#).unwrap();

        let it = BridgeConfig::try_load_or_default(Some(&path)).unwrap();
        assert_eq!(it.repl_buffer_name, "*repl*");
    }

    #[test]
    fn test_try_load_bad_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let report = BridgeConfig::try_load(&path).unwrap_err();
        let error = report.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_try_load_missing_explicit_path_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let report =
            BridgeConfig::try_load(&dir.path().join("nope.json")).unwrap_err();
        let error = report.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(error, ConfigError::Read { .. }));
    }
}
