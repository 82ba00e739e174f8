// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
mod repl_commands;
mod repl_session;
mod session_shell;

// Re-export.
pub use repl_commands::*;
pub use repl_session::*;
pub use session_shell::*;
