// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Turns the bytes an interpreter emits, one at a time, into text. A multi-byte UTF-8
/// sequence that arrives across several calls to [`OutputDecoder::push_byte`] is held
/// back until it is complete. Invalid bytes decode to `U+FFFD`.
#[derive(Debug, Default)]
pub struct OutputDecoder {
    /// Bytes of an incomplete UTF-8 sequence. Never more than 3.
    partial: Vec<u8>,
    /// Text decoded since the last [`OutputDecoder::take_text`].
    decoded: String,
}

impl OutputDecoder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn push_byte(&mut self, byte: u8) {
        self.partial.push(byte);
        self.decode_partial();
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.push_byte(*byte);
        }
    }

    /// Takes the text decoded so far. An incomplete trailing sequence stays buffered.
    pub fn take_text(&mut self) -> String { std::mem::take(&mut self.decoded) }

    /// No more bytes will come, so an incomplete trailing sequence decodes to `U+FFFD`.
    pub fn finish(&mut self) {
        if !self.partial.is_empty() {
            self.partial.clear();
            self.decoded.push(char::REPLACEMENT_CHARACTER);
        }
    }

    #[must_use]
    pub fn has_text(&self) -> bool { !self.decoded.is_empty() }

    #[must_use]
    pub fn has_partial(&self) -> bool { !self.partial.is_empty() }

    fn decode_partial(&mut self) {
        while !self.partial.is_empty() {
            match std::str::from_utf8(&self.partial) {
                Ok(text) => {
                    self.decoded.push_str(text);
                    self.partial.clear();
                }
                Err(error) => {
                    let valid_up_to = error.valid_up_to();
                    match error.error_len() {
                        // Incomplete sequence at the end, wait for more bytes.
                        None => {
                            if valid_up_to > 0 {
                                self.move_valid_prefix(valid_up_to);
                            }
                            return;
                        }
                        Some(invalid_len) => {
                            self.move_valid_prefix(valid_up_to);
                            self.decoded.push(char::REPLACEMENT_CHARACTER);
                            self.partial.drain(..invalid_len);
                        }
                    }
                }
            }
        }
    }

    fn move_valid_prefix(&mut self, valid_up_to: usize) {
        let prefix: Vec<u8> = self.partial.drain(..valid_up_to).collect();
        // The prefix was just validated.
        self.decoded.push_str(&String::from_utf8_lossy(&prefix));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case("plain ascii"; "ascii")]
    #[test_case("λ → ✓"; "two and three byte sequences")]
    #[test_case("🦀 crab"; "four byte sequence")]
    fn test_bytewise_decode(text: &str) {
        let mut decoder = OutputDecoder::new();
        decoder.push_bytes(text.as_bytes());
        assert_eq!(decoder.take_text(), text);
        assert!(!decoder.has_partial());
    }

    #[test]
    fn test_sequence_split_across_ticks() {
        let mut decoder = OutputDecoder::new();
        let bytes = "a🦀".as_bytes();

        decoder.push_bytes(&bytes[..3]);
        assert_eq!(decoder.take_text(), "a");
        assert!(decoder.has_partial());

        decoder.push_bytes(&bytes[3..]);
        assert_eq!(decoder.take_text(), "🦀");
        assert!(!decoder.has_partial());
    }

    #[test]
    fn test_finish_flushes_incomplete_sequence() {
        let mut decoder = OutputDecoder::new();
        decoder.push_bytes(&[b'o', b'k', 0xF0, 0x9F]);
        assert_eq!(decoder.take_text(), "ok");

        decoder.finish();
        assert!(!decoder.has_partial());
        assert_eq!(decoder.take_text(), "\u{FFFD}");

        // Nothing pending, nothing added.
        decoder.finish();
        assert!(!decoder.has_text());
    }

    #[test]
    fn test_invalid_byte_is_replaced() {
        let mut decoder = OutputDecoder::new();
        decoder.push_bytes(&[b'x', 0xFF, b'y']);
        assert_eq!(decoder.take_text(), "x\u{FFFD}y");
    }

    #[test]
    fn test_truncated_sequence_followed_by_ascii() {
        let mut decoder = OutputDecoder::new();
        // First two bytes of a three byte sequence, then ascii.
        decoder.push_bytes(&[0xE2, 0x86, b'z']);
        assert_eq!(decoder.take_text(), "\u{FFFD}z");
    }
}
