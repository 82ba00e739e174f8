// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{InputQueue, OutputDecoder, PullResult};

/// What the editor side can push to an interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPayload {
    Text(String),
    EndOfInput,
}

impl From<&str> for InputPayload {
    fn from(text: &str) -> Self { InputPayload::Text(text.to_string()) }
}

impl From<String> for InputPayload {
    fn from(text: String) -> Self { InputPayload::Text(text) }
}

/// Per process I/O state: the pending input, and the output decoded during the current
/// tick that hasn't been delivered to the bound buffer yet.
#[derive(Debug, Default)]
pub struct IoChannel {
    input: InputQueue,
    output: OutputDecoder,
}

impl IoChannel {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn push_input(&mut self, payload: InputPayload) {
        match payload {
            InputPayload::Text(text) => self.input.push_text(&text),
            InputPayload::EndOfInput => self.input.push_end_of_input(),
        }
    }

    pub fn pull_input(&mut self) -> PullResult { self.input.pull() }

    pub fn emit_output(&mut self, byte: u8) { self.output.push_byte(byte); }

    /// Everything decoded since the last call. Called once at the end of each tick, so a
    /// single delivery only ever coalesces writes from the same tick.
    pub fn take_output(&mut self) -> Option<String> {
        self.output.has_text().then(|| self.output.take_text())
    }

    /// The runtime finished: flush an incomplete trailing sequence as `U+FFFD`.
    pub fn finish_output(&mut self) { self.output.finish(); }

    #[must_use]
    pub fn pending_input_len(&self) -> usize { self.input.len() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_push_text_then_end_of_input() {
        let mut channel = IoChannel::new();
        channel.push_input("hi".into());
        channel.push_input(InputPayload::EndOfInput);

        assert_eq!(channel.pending_input_len(), 3);
        assert_eq!(channel.pull_input(), PullResult::Byte(b'h'));
        assert_eq!(channel.pull_input(), PullResult::Byte(b'i'));
        assert_eq!(channel.pull_input(), PullResult::EndOfInput);
        assert_eq!(channel.pull_input(), PullResult::Empty);
    }

    #[test]
    fn test_take_output_per_tick() {
        let mut channel = IoChannel::new();
        assert_eq!(channel.take_output(), None);

        for byte in "> ".bytes() {
            channel.emit_output(byte);
        }
        // Half of "é".
        channel.emit_output(0xC3);
        assert_eq!(channel.take_output(), Some("> ".to_string()));

        channel.emit_output(0xA9);
        assert_eq!(channel.take_output(), Some("é".to_string()));
        assert_eq!(channel.take_output(), None);
    }
}
