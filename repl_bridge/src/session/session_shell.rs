// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The shell commands of [`crate::line_protocol`], bound to the process of a buffer.

use crate::{BufferId, EditorHost, EnterOutcome, InputPayload, InputSink, ProcessHandle,
            ReplSession, shell_delete_char_or_eof, shell_enter, shell_interrupt,
            shell_send_input, shell_toggle};

/// Sends to one process, or nowhere if the buffer has none.
#[derive(Debug)]
pub struct ProcessInputSink<'a, H: EditorHost + 'static> {
    session: &'a ReplSession<H>,
    handle: Option<ProcessHandle>,
}

impl<H: EditorHost + 'static> InputSink for ProcessInputSink<'_, H> {
    fn push_input(&self, payload: InputPayload) {
        if let Some(handle) = self.handle {
            self.session.push_input(handle, payload);
        }
    }

    fn interrupt(&self) {
        if let Some(handle) = self.handle {
            self.session.interrupt(handle);
        }
    }
}

impl<H: EditorHost + 'static> ReplSession<H> {
    #[must_use]
    pub fn input_sink(&self, buffer: BufferId) -> ProcessInputSink<'_, H> {
        ProcessInputSink {
            session: self,
            handle: self.buffer_process(buffer),
        }
    }

    /// Enter key in a REPL buffer. See [`shell_enter`].
    pub fn submit(&self, buffer: BufferId) -> EnterOutcome {
        shell_enter(self.host().as_ref(), buffer, &self.input_sink(buffer))
    }

    /// See [`shell_send_input`].
    pub fn send_input(&self, buffer: BufferId, input: &str) {
        shell_send_input(self.host().as_ref(), buffer, &self.input_sink(buffer), input);
    }

    /// See [`shell_delete_char_or_eof`].
    pub fn delete_char_or_eof(&self, buffer: BufferId) -> bool {
        shell_delete_char_or_eof(self.host().as_ref(), buffer, &self.input_sink(buffer))
    }

    /// Interrupt the process of `buffer`. See [`shell_interrupt`].
    pub fn interrupt_buffer(&self, buffer: BufferId) {
        shell_interrupt(&self.input_sink(buffer));
    }

    /// See [`shell_toggle`].
    pub fn toggle(&self, buffer: BufferId) { shell_toggle(self.host().as_ref(), buffer); }
}
