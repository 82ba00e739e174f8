// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::VecDeque;

/// One pending unit of interpreter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputUnit {
    Byte(u8),
    EndOfInput,
}

/// What [`InputQueue::pull`] hands back. Unlike [`InputUnit`], this can say that there
/// is nothing pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullResult {
    Byte(u8),
    EndOfInput,
    Empty,
}

impl From<Option<InputUnit>> for PullResult {
    fn from(maybe_unit: Option<InputUnit>) -> Self {
        match maybe_unit {
            Some(InputUnit::Byte(byte)) => PullResult::Byte(byte),
            Some(InputUnit::EndOfInput) => PullResult::EndOfInput,
            None => PullResult::Empty,
        }
    }
}

/// Unbounded FIFO. Single producer (the editor), single consumer (the runtime, during a
/// scheduler tick). Both run on the same thread, so there is no locking.
#[derive(Debug, Default)]
pub struct InputQueue {
    units: VecDeque<InputUnit>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Appends exactly the UTF-8 bytes of `text`. No terminator is added.
    pub fn push_text(&mut self, text: &str) {
        self.units
            .extend(text.as_bytes().iter().copied().map(InputUnit::Byte));
    }

    pub fn push_end_of_input(&mut self) { self.units.push_back(InputUnit::EndOfInput); }

    /// Non-blocking. Removes the front unit.
    pub fn pull(&mut self) -> PullResult { self.units.pop_front().into() }

    #[must_use]
    pub fn len(&self) -> usize { self.units.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.units.is_empty() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn drain_bytes(queue: &mut InputQueue) -> Vec<u8> {
        let mut acc = vec![];
        while let PullResult::Byte(byte) = queue.pull() {
            acc.push(byte);
        }
        acc
    }

    #[test]
    fn test_fifo_order_with_interleaved_pulls() {
        let mut queue = InputQueue::new();
        let mut pulled = vec![];

        queue.push_text("ab");
        if let PullResult::Byte(byte) = queue.pull() {
            pulled.push(byte);
        }
        queue.push_text("cd");
        queue.push_text("");
        queue.push_text("é");
        pulled.extend(drain_bytes(&mut queue));

        assert_eq!(pulled, "abcdé".as_bytes());
    }

    #[test]
    fn test_end_of_input_framing() {
        let mut queue = InputQueue::new();
        queue.push_text("1");
        queue.push_text("2");
        queue.push_end_of_input();

        assert_eq!(queue.pull(), PullResult::Byte(b'1'));
        assert_eq!(queue.pull(), PullResult::Byte(b'2'));
        assert_eq!(queue.pull(), PullResult::EndOfInput);
        for _ in 0..5 {
            assert_eq!(queue.pull(), PullResult::Empty);
        }
    }

    #[test]
    fn test_no_trailing_zero_byte() {
        let mut queue = InputQueue::new();
        queue.push_text("(+ 1 2)\n");
        assert_eq!(queue.len(), 8);
        assert_eq!(drain_bytes(&mut queue), b"(+ 1 2)\n");
        assert!(queue.is_empty());
    }
}
