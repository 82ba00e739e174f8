// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Connect to source file.
pub mod common;
pub mod config;
pub mod log;

// Re-export.
pub use common::*;
pub use config::*;
pub use log::*;
