// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::ops::Add;

use tracing::dispatcher;
use tracing_core::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::try_create_layers;

/// Where log output goes. The bridge runs inside an editor (or the `rbridge` binary,
/// whose stdout is the interpreter's output), so [`WriterConfig::File`] is the usual
/// choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

/// Configure the tracing subscriber. Build one from any of the types in
/// [`tracing_config_options`] and combine them with `+`.
#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

impl TracingConfig {
    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    /// Install as the global default subscriber. This can only be done once per process.
    ///
    /// # Errors
    ///
    /// Returns an error if the layers can't be created (eg, the log file can't be
    /// opened), or if a global subscriber has already been installed.
    pub fn install_global(self) -> miette::Result<()> {
        let layers = try_create_layers(self)?.unwrap_or_default();
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|e| miette::miette!("Failed to install global subscriber: {e}"))
    }

    /// Install as the subscriber for the current thread only. The subscriber is removed
    /// when the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the layers can't be created.
    pub fn install_thread_local(self) -> miette::Result<dispatcher::DefaultGuard> {
        let layers = try_create_layers(self)?.unwrap_or_default();
        let subscriber = tracing_subscriber::registry().with(layers);
        Ok(tracing::subscriber::set_default(subscriber))
    }
}

/// Conversions into [`TracingConfig`], so that the `try_initialize_logging_*` functions
/// can take `impl Into<TracingConfig>`:
///
/// ```no_run
/// use r3bl_repl_bridge::{DisplayPreference, TracingConfig, WriterConfig,
///                        try_initialize_logging_global};
///
/// let level_filter = tracing_core::LevelFilter::DEBUG;
/// let config_1: TracingConfig = level_filter.into();
/// let config_2: TracingConfig = DisplayPreference::Stderr.into();
///
/// try_initialize_logging_global(config_1 + config_2);
/// ```
pub mod tracing_config_options {
    use super::{Add, DisplayPreference, LevelFilter, TracingConfig, WriterConfig};

    pub const DEFAULT_LOG_FILE_NAME: &str = "log.txt";

    impl From<tracing::Level> for TracingConfig {
        fn from(level: tracing::Level) -> Self {
            Self {
                level_filter: level.into(),
                writer_config: WriterConfig::File(DEFAULT_LOG_FILE_NAME.to_string()),
            }
        }
    }

    impl From<LevelFilter> for TracingConfig {
        fn from(level_filter: LevelFilter) -> Self {
            Self {
                level_filter,
                writer_config: WriterConfig::File(DEFAULT_LOG_FILE_NAME.to_string()),
            }
        }
    }

    impl From<DisplayPreference> for TracingConfig {
        fn from(preferred_display: DisplayPreference) -> Self {
            Self {
                level_filter: LevelFilter::DEBUG,
                writer_config: WriterConfig::Display(preferred_display),
            }
        }
    }

    impl From<WriterConfig> for TracingConfig {
        fn from(writer_config: WriterConfig) -> Self {
            Self {
                level_filter: LevelFilter::DEBUG,
                writer_config,
            }
        }
    }

    /// Merge two [`TracingConfig`] instances. The more verbose level wins.
    impl Add<TracingConfig> for TracingConfig {
        type Output = Self;

        fn add(self, rhs: Self) -> Self::Output {
            Self {
                level_filter: self.level_filter.max(rhs.level_filter),
                writer_config: self.writer_config + rhs.writer_config,
            }
        }
    }

    /// Merge two [`WriterConfig`] instances. The `rhs` has higher specificity, and
    /// clobbers `self` for any field it sets.
    impl Add<WriterConfig> for WriterConfig {
        type Output = Self;

        fn add(self, rhs: WriterConfig) -> Self::Output {
            use WriterConfig::{Display, DisplayAndFile, File, None};

            match (self, rhs) {
                // No collision merge.
                (None, it) | (it, None) => it,
                (Display(display), File(file)) | (File(file), Display(display)) => {
                    DisplayAndFile(display, file)
                }

                // Collision (rhs has higher specificity).
                (Display(_) | File(_) | DisplayAndFile(..), DisplayAndFile(display, file)) => {
                    DisplayAndFile(display, file)
                }
                (Display(_), Display(display)) => Display(display),
                (File(_), File(file)) => File(file),
                (DisplayAndFile(_, file), Display(display))
                | (DisplayAndFile(display, _), File(file)) => DisplayAndFile(display, file),
            }
        }
    }

    #[cfg(test)]
    mod tests_add_writer_configs {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn test_add_writer_configs() {
            let file = WriterConfig::File("log.txt".into());
            let stdout = WriterConfig::Display(DisplayPreference::Stdout);
            let stderr = WriterConfig::Display(DisplayPreference::Stderr);

            assert_eq!(WriterConfig::None + file.clone(), file);
            assert_eq!(file.clone() + WriterConfig::None, file);
            assert_eq!(
                stdout.clone() + file.clone(),
                WriterConfig::DisplayAndFile(DisplayPreference::Stdout, "log.txt".into())
            );
            assert_eq!(
                file.clone() + stderr.clone(),
                WriterConfig::DisplayAndFile(DisplayPreference::Stderr, "log.txt".into())
            );
            assert_eq!(stdout + stderr.clone(), stderr);
            assert_eq!(
                WriterConfig::DisplayAndFile(DisplayPreference::Stdout, "a.txt".into())
                    + WriterConfig::File("b.txt".into()),
                WriterConfig::DisplayAndFile(DisplayPreference::Stdout, "b.txt".into())
            );
        }

        #[test]
        fn test_add_tracing_configs_keeps_most_verbose_level() {
            let lhs: TracingConfig = LevelFilter::WARN.into();
            let rhs: TracingConfig = DisplayPreference::Stderr.into();
            let it = lhs + rhs;
            assert_eq!(it.level_filter, LevelFilter::DEBUG);
            assert_eq!(
                it.writer_config,
                WriterConfig::DisplayAndFile(
                    DisplayPreference::Stderr,
                    DEFAULT_LOG_FILE_NAME.into()
                )
            );
        }
    }
}
