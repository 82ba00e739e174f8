// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The commands a REPL buffer's keymap binds: enter, delete-char-or-EOF, interrupt, and
//! toggle, plus [`shell_send_input`] for programmatic callers.

use tracing::trace;

use super::{prompt_boundary_col, strip_prompt};
use crate::{BufferId, BufferText, InputPayload, RowCol, ViewCoordinator};

/// Where the shell commands send their input. The session binds one to the process of
/// the buffer; it does nothing if the buffer has no process.
pub trait InputSink {
    fn push_input(&self, payload: InputPayload);

    fn interrupt(&self);
}

/// What [`shell_enter`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    /// The caret was on the last row, and this line was sent.
    Sent(String),
    /// The caret was on an earlier row, whose input was copied to the last row after the
    /// prompt, ready to be edited and sent.
    Recalled(String),
}

/// Enter key.
///
/// - Caret on the last row: insert a newline at the end of the buffer, so the prompt
///   line stays visible, and send the row's input (the row minus its prompt).
/// - Caret on an earlier row: new output may have arrived since the user started editing
///   that row. Replace everything after the last row's prompt with the earlier row's
///   input, and send nothing.
///
/// Either way the caret ends up at the end of the buffer.
pub fn shell_enter(
    host: &impl BufferText,
    buffer: BufferId,
    sink: &impl InputSink,
) -> EnterOutcome {
    let caret = host.caret(buffer);
    let end = host.end_of_buffer(buffer);
    let caret_row = host.row(buffer, caret.row).unwrap_or_default();
    let line = strip_prompt(&caret_row).to_string();

    let outcome = if caret.row == end.row {
        host.replace_range(buffer, end, end, "\n");
        sink.push_input(InputPayload::Text(format!("{line}\n")));
        EnterOutcome::Sent(line)
    } else {
        let last_row = host.last_row(buffer);
        let start = RowCol::new(end.row, prompt_boundary_col(&last_row));
        host.replace_range(buffer, start, end, &line);
        EnterOutcome::Recalled(line)
    };

    host.move_caret_to_end(buffer);
    trace!(%buffer, ?outcome, "shell_enter");
    outcome
}

/// Send `input` as if it had been typed after the prompt: whatever the user had typed
/// after the prompt is replaced, `input` plus a newline is appended for visibility,
/// and the same text is sent.
pub fn shell_send_input(
    host: &impl BufferText,
    buffer: BufferId,
    sink: &impl InputSink,
    input: &str,
) {
    let end = host.end_of_buffer(buffer);
    let last_row = host.last_row(buffer);
    let start = RowCol::new(end.row, prompt_boundary_col(&last_row));
    host.replace_range(buffer, start, end, "");

    let input = format!("{input}\n");
    host.append_text(buffer, &input);
    sink.push_input(InputPayload::Text(input));
}

/// `C-d`. On an empty prompt line with the caret at the very end, this sends end of
/// input. A line with only whitespace after the prompt is not empty, so there (and
/// anywhere else) it deletes the char at the caret.
///
/// Returns whether end of input was sent.
pub fn shell_delete_char_or_eof(
    host: &impl BufferText,
    buffer: BufferId,
    sink: &impl InputSink,
) -> bool {
    let caret = host.caret(buffer);
    let at_end = caret == host.end_of_buffer(buffer);
    let caret_row = host.row(buffer, caret.row).unwrap_or_default();

    if at_end && strip_prompt(&caret_row).is_empty() {
        sink.push_input(InputPayload::EndOfInput);
        true
    } else {
        host.delete_char(buffer);
        false
    }
}

/// `C-c C-c`. Never touches the buffer.
pub fn shell_interrupt(sink: &impl InputSink) { sink.interrupt(); }

/// Show the buffer, or if it is already the active one, switch away from it.
pub fn shell_toggle(view: &impl ViewCoordinator, buffer: BufferId) {
    if view.active_buffer() == Some(buffer) {
        view.switch_to_next_buffer();
    } else {
        view.switch_to_buffer(buffer);
    }
}
