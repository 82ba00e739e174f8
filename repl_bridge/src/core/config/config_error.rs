// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::PathBuf;

/// Errors from loading a [`crate::BridgeConfig`] file. A missing file is not an error
/// (defaults are used), but a file that exists and can't be read or parsed is.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("📑 Could not read config file: '{}'", path.display())]
    #[diagnostic(
        code(r3bl_repl_bridge::config::read),
        help("Check that the file exists and that you have permission to read it.")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("🔍 Could not parse config file: '{}'", path.display())]
    #[diagnostic(
        code(r3bl_repl_bridge::config::parse),
        help(
            "The config file must be a JSON object. Every field is optional, \
             eg: {{ \"interpreter\": {{ \"command\": \"gsi\" }} }}"
        )
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
