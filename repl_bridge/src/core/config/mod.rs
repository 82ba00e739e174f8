// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod bridge_config;
pub mod config_error;
pub mod config_folder;

// Re-export.
pub use bridge_config::*;
pub use config_error::*;
pub use config_folder::*;
