// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Errors from starting an interpreter in a pseudo terminal. They surface from
/// [`crate::InterpreterRuntime::entry`], which terminates the process.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RuntimeSpawnError {
    #[error("🖥️ Could not open a pseudo terminal: {details}")]
    #[diagnostic(code(r3bl_repl_bridge::runtime::open_pty))]
    OpenPty { details: String },

    #[error("🚀 Could not start interpreter '{command}': {details}")]
    #[diagnostic(
        code(r3bl_repl_bridge::runtime::spawn),
        help(
            "Check that the command is on your PATH. It can be set with --command, or \
             with \"interpreter\": {{ \"command\": ... }} in the config file."
        )
    )]
    Spawn { command: String, details: String },

    #[error("🔌 Could not connect to the pseudo terminal: {details}")]
    #[diagnostic(code(r3bl_repl_bridge::runtime::pty_io))]
    PtyIo { details: String },
}
