// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Shell style framing: turns row oriented buffer edits into logical input lines for
//! the interpreter, skipping the prompt the interpreter rendered at the start of the
//! last row.

// Attach.
mod prompt;
mod shell_commands;

// Re-export.
pub use prompt::*;
pub use shell_commands::*;
