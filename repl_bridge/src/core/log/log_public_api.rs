// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tracing::dispatcher;

use super::TracingConfig;

/// Global default subscriber, which once set, can't be unset or changed. This is what
/// the `rbridge` binary uses.
///
/// Logging is **DISABLED** by **default**. If the level filter is
/// [`tracing_core::LevelFilter::OFF`] this does nothing, and the [`tracing::debug!`] etc.
/// calls sprinkled through the bridge cost next to nothing.
///
/// # Errors
///
/// Returns an error if the log file can't be created, or a global subscriber is already
/// installed.
pub fn try_initialize_logging_global(
    options: impl Into<TracingConfig>,
) -> miette::Result<()> {
    let it: TracingConfig = options.into();

    // Early return if the level filter is off.
    if matches!(it.get_level_filter(), tracing_core::LevelFilter::OFF) {
        return crate::ok!();
    }

    it.install_global()
}

/// Thread local subscriber. Great for tests, since each test gets its own.
///
/// Returns `None` when the level filter is [`tracing_core::LevelFilter::OFF`].
///
/// # Errors
///
/// Returns an error if the log file can't be created.
pub fn try_initialize_logging_thread_local(
    options: impl Into<TracingConfig>,
) -> miette::Result<Option<dispatcher::DefaultGuard>> {
    let it: TracingConfig = options.into();

    // Early return if the level filter is off.
    if matches!(it.get_level_filter(), tracing_core::LevelFilter::OFF) {
        return Ok(None);
    }

    it.install_thread_local().map(Some)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tracing_core::LevelFilter;

    use super::*;
    use crate::{DisplayPreference, WriterConfig};

    #[test]
    #[serial]
    fn test_logging_off_installs_nothing() {
        let config = TracingConfig {
            writer_config: WriterConfig::Display(DisplayPreference::Stderr),
            level_filter: LevelFilter::OFF,
        };
        let guard = try_initialize_logging_thread_local(config).unwrap();
        assert!(guard.is_none());
    }

    #[test]
    #[serial]
    fn test_thread_local_logging_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("thread_local.log");
        let config = TracingConfig {
            writer_config: WriterConfig::File(file_path.to_string_lossy().to_string()),
            level_filter: LevelFilter::DEBUG,
        };

        let guard = try_initialize_logging_thread_local(config).unwrap();
        assert!(guard.is_some());
        tracing::debug!(handle = 7, "started");
        drop(guard);

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert!(content.contains("started"));
    }
}
