// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod scripted_runtime;

// Re-export.
pub use scripted_runtime::*;
