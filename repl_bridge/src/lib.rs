// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # `r3bl_repl_bridge`
//!
//! Run an interactive read-eval-print interpreter inside an editor, and drive it as if
//! it were a process: send it keystrokes, get its output incrementally, interrupt or
//! kill it, and jump to the `"file"@line.col` locations it reports.
//!
//! ```text
//! ┌────────────────────┐  submit / send   ┌──────────────┐  pull_input  ┌─────────────┐
//! │ Editor buffer      │ ───────────────► │ IoChannel    │ ───────────► │ Interpreter │
//! │ (EditorHost)       │                  │ (per handle) │              │ runtime     │
//! │                    │ ◄─── append ──── │              │ ◄─────────── │             │
//! └────────┬───────────┘   + diagnostics  └──────────────┘  emit_output └──────▲──────┘
//!          │ pinpoint "file"@l.c                                               │ tick
//!          ▼                                                          ┌────────┴──────┐
//! ┌────────────────────┐                                              │ Scheduler     │
//! │ ViewCoordinator    │                                              │ (one task per │
//! └────────────────────┘                                              │  process)     │
//!                                                                     └───────────────┘
//! ```
//!
//! Everything runs on a single thread. The scheduler is a [`tokio`] task on the
//! session's own [`tokio::task::LocalSet`], and processes only tick while that set is
//! driven (see [`ReplSession::local_set`]).
//!
//! The entry point is [`ReplSession`]. The editor side is abstracted by the
//! [`EditorHost`] traits; [`HeadlessEditor`] is a complete in-memory implementation.
//! The interpreter side is abstracted by [`InterpreterRuntime`];
//! [`PtyInterpreterRuntime`] runs any command line interpreter in a pseudo terminal.

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules (re-exported below to provide clean public API).
pub mod core;
pub mod diagnostic;
pub mod editor_port;
pub mod io_channel;
pub mod line_protocol;
pub mod process;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod test_fixtures;

// Re-export.
pub use core::*;
pub use diagnostic::*;
pub use editor_port::*;
pub use io_channel::*;
pub use line_protocol::*;
pub use process::*;
pub use runtime::*;
pub use scheduler::*;
pub use session::*;
pub use test_fixtures::*;
