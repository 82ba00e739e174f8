// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Commands that work on "the" REPL buffer (named by
//! [`crate::BridgeConfig::repl_buffer_name`]), creating it and its process on first use.
//! The debugger commands are the Gambit style `,` commands typed at a REPL prompt.

use tracing::debug;

use crate::{BufferId, EditorHost, ReplSession, show_maybe_splitting};

/// REPL debugger commands. [`std::fmt::Display`] gives the text sent to the
/// interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum ReplCommand {
    /// Move to an older frame of the backtrace.
    #[strum(serialize = ",+")]
    BacktraceOlder,
    /// Move to a newer frame of the backtrace.
    #[strum(serialize = ",-")]
    BacktraceNewer,
    #[strum(serialize = ",c")]
    Continue,
    #[strum(serialize = ",l")]
    LeapContinuation,
    #[strum(serialize = ",s")]
    StepContinuation,
}

/// `(load "<name>")`, with the name written as a string literal.
#[must_use]
pub fn load_expression(file_name: &str) -> String {
    let mut acc = String::from("(load \"");
    for ch in file_name.chars() {
        if matches!(ch, '"' | '\\') {
            acc.push('\\');
        }
        acc.push(ch);
    }
    acc.push_str("\")");
    acc
}

impl<H: EditorHost + 'static> ReplSession<H> {
    /// Create a buffer named `name` bound to a new process of `kind`, and start it. The
    /// buffer is created even if the kind isn't supported; it just has no process.
    pub fn create_shell_buffer(&self, name: &str, kind: &str) -> BufferId {
        let buffer = self.host().create_buffer(name);
        if let Some(handle) = self.make(kind) {
            self.bind(handle, buffer);
            self.start(handle);
        }
        debug!(name, kind, %buffer, "shell buffer created");
        buffer
    }

    /// The REPL buffer, created on first use. Unless `prevent_split`, it is made visible
    /// in the bottom part of the layout if it isn't already.
    pub fn with_repl_buffer(&self, prevent_split: bool) -> BufferId {
        let config = self.config();
        let buffer = match self.host().find_buffer(&config.repl_buffer_name) {
            Some(it) => it,
            None => self.create_shell_buffer(&config.repl_buffer_name, &config.process_kind),
        };
        if !prevent_split {
            show_maybe_splitting(self.host().as_ref(), buffer, config.split_percent);
        }
        buffer
    }

    /// Show the REPL buffer in the active frame.
    pub fn run_repl(&self) -> BufferId {
        let buffer = self.with_repl_buffer(true);
        self.host().switch_to_buffer(buffer);
        buffer
    }

    /// Switch to the REPL buffer, or away from it if it is the active one.
    pub fn repl_toggle(&self) {
        let buffer = self.with_repl_buffer(true);
        self.toggle(buffer);
    }

    /// Have the interpreter load `file_name`.
    pub fn load_file(&self, file_name: &str) {
        let buffer = self.with_repl_buffer(false);
        self.send_input(buffer, &load_expression(file_name));
    }

    /// Evaluate `expression` (eg, the sexp before the caret in a source buffer).
    pub fn send_expression(&self, expression: &str) {
        let buffer = self.with_repl_buffer(false);
        self.send_input(buffer, expression);
    }

    pub fn send_repl_command(&self, command: ReplCommand) {
        let buffer = self.with_repl_buffer(false);
        self.send_input(buffer, &command.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::{rc::Rc, time::Duration};

    use strum::IntoEnumIterator;
    use test_case::test_case;

    use super::*;
    use crate::{BridgeConfig, HeadlessEditor, ProcessState, ScriptedRuntime,
                ScriptedRuntimeFactory, ViewCoordinator};

    fn session() -> (ReplSession<HeadlessEditor>, HeadlessEditor) {
        let editor = HeadlessEditor::new();
        let config = BridgeConfig::default();
        let factory = ScriptedRuntimeFactory::new(&config.process_kind, || {
            ScriptedRuntime::interactive(Duration::from_millis(1))
        });
        let session = ReplSession::new(Rc::new(editor.clone()), factory, config);
        (session, editor)
    }

    #[test_case("foo.scm" => r#"(load "foo.scm")"#; "plain")]
    #[test_case(r#"a "q".scm"# => r#"(load "a \"q\".scm")"#; "quotes escaped")]
    #[test_case(r"C:\x.scm" => r#"(load "C:\\x.scm")"#; "backslash escaped")]
    fn test_load_expression(name: &str) -> String { load_expression(name) }

    #[test]
    fn test_repl_command_wire_text() {
        let all: Vec<String> = ReplCommand::iter().map(|it| it.to_string()).collect();
        assert_eq!(all, vec![",+", ",-", ",c", ",l", ",s"]);
    }

    #[tokio::test]
    async fn test_with_repl_buffer_creates_once_and_splits() {
        let (session, editor) = session();
        session
            .local_set()
            .run_until(async {
                let scratch = editor.active_buffer().unwrap();

                let buffer = session.with_repl_buffer(false);
                assert_eq!(editor.buffer_name(buffer).unwrap(), "*scheme*");
                let handle = session.buffer_process(buffer).unwrap();
                assert_eq!(session.state(handle), Some(ProcessState::Running));

                let frames = editor.frames();
                assert_eq!(frames.len(), 2);
                assert_eq!(frames[0].buffer, scratch);
                assert_eq!(frames[1].buffer, buffer);
                assert_eq!(frames[1].height_percent, 33);
                assert_eq!(editor.active_buffer(), Some(scratch));

                assert_eq!(session.with_repl_buffer(true), buffer);
                assert_eq!(session.buffer_process(buffer), Some(handle));
                session.kill(handle);
            })
            .await;
    }

    #[tokio::test]
    async fn test_create_shell_buffer_with_unsupported_kind() {
        let (session, editor) = session();
        session
            .local_set()
            .run_until(async {
                let buffer = session.create_shell_buffer("*other*", "no-such-kind");
                assert_eq!(editor.find_buffer("*other*"), Some(buffer));
                assert_eq!(session.buffer_process(buffer), None);
                assert_eq!(editor.subscription_count(), 0);

                // The shell commands still edit the buffer, but send nothing.
                session.send_input(buffer, "(+ 1 2)");
                assert_eq!(editor.buffer_text(buffer).unwrap(), "(+ 1 2)\n");
            })
            .await;
    }

    #[tokio::test]
    async fn test_load_file_and_debugger_commands_reach_the_interpreter() {
        let (session, editor) = session();
        session
            .local_set()
            .run_until(async {
                let buffer = session.with_repl_buffer(true);
                let handle = session.buffer_process(buffer).unwrap();

                session.load_file("foo.scm");
                session.send_repl_command(ReplCommand::BacktraceOlder);
                session.send_expression("(car x)");

                assert_eq!(
                    editor.buffer_text(buffer).unwrap(),
                    "(load \"foo.scm\")\n,+\n(car x)\n"
                );
                let pending = session
                    .inner
                    .registry
                    .borrow()
                    .get(handle)
                    .unwrap()
                    .channel
                    .pending_input_len();
                assert_eq!(pending, "(load \"foo.scm\")\n,+\n(car x)\n".len());
                session.kill(handle);
            })
            .await;
    }

    #[tokio::test]
    async fn test_run_repl_and_toggle() {
        let (session, editor) = session();
        session
            .local_set()
            .run_until(async {
                let scratch = editor.active_buffer().unwrap();

                let buffer = session.run_repl();
                assert_eq!(editor.active_buffer(), Some(buffer));
                assert_eq!(editor.frames().len(), 1);

                session.repl_toggle();
                assert_eq!(editor.active_buffer(), Some(scratch));
                session.repl_toggle();
                assert_eq!(editor.active_buffer(), Some(buffer));

                if let Some(handle) = session.buffer_process(buffer) {
                    session.kill(handle);
                }
            })
            .await;
    }
}
