// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod pty_runtime;
pub mod runtime_error;

// Re-export.
pub use pty_runtime::*;
pub use runtime_error::*;
