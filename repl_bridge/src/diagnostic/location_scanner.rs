// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Scanner for locations like `*** ERROR IN "foo.scm"@8.2 -- Unbound variable: x`.
//!
//! Wire format: a double quoted filename, `@`, a 1-based line, `.`, a 1-based column.
//! Inside the quotes, `\"` stands for a quote and `\\` for a backslash; any other
//! backslash is kept as is (so `"C:\src\a.scm"` works). A filename never spans lines.

use std::fmt::{Display, Formatter, Result, Write as _};

use crate::RowCol;

/// A location reported by the interpreter, converted to 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub filename: String,
    pub line: usize,
    pub column: usize,
}

impl DiagnosticLocation {
    #[must_use]
    pub fn new(filename: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
            column,
        }
    }

    #[must_use]
    pub fn row_col(&self) -> RowCol { RowCol::new(self.line, self.column) }
}

impl Display for DiagnosticLocation {
    /// Back in the 1-based wire format. Only quotes and backslashes are escaped.
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_char('"')?;
        for ch in self.filename.chars() {
            if matches!(ch, '"' | '\\') {
                f.write_char('\\')?;
            }
            f.write_char(ch)?;
        }
        write!(f, "\"@{}.{}", self.line + 1, self.column + 1)
    }
}

/// Looks at the output delivered in one event. Returns the location on the most recent
/// completed line that has one, or `None`.
///
/// `previous_last_row` is the content of the buffer's last row before `new_text` was
/// appended, so a line that was already partly on screen is seen whole. Nothing is
/// scanned unless `new_text` completes at least one line, and the trailing incomplete
/// segment is ignored (it will be seen again once its newline arrives).
#[must_use]
pub fn find_latest_location(
    previous_last_row: &str,
    new_text: &str,
) -> Option<DiagnosticLocation> {
    if !new_text.contains('\n') {
        return None;
    }

    let text = format!("{previous_last_row}{new_text}");
    let mut lines: Vec<&str> = text.split('\n').collect();
    // Drop the incomplete segment after the last newline.
    lines.pop();

    lines.into_iter().rev().find_map(scan_line)
}

/// Leftmost location on a single line.
#[must_use]
pub fn scan_line(line: &str) -> Option<DiagnosticLocation> {
    line.match_indices('"')
        .find_map(|(quote_index, _)| scan_at(&line[quote_index + 1..]))
}

/// `rest` starts just after an opening quote.
fn scan_at(rest: &str) -> Option<DiagnosticLocation> {
    let (filename, after_filename) = scan_quoted(rest)?;
    let after_at = after_filename.strip_prefix('@')?;
    let (line, after_line) = scan_number(after_at)?;
    let after_dot = after_line.strip_prefix('.')?;
    let (column, _) = scan_number(after_dot)?;

    Some(DiagnosticLocation {
        filename,
        line: line.saturating_sub(1),
        column: column.saturating_sub(1),
    })
}

/// Returns the unescaped filename and what follows the closing quote.
fn scan_quoted(rest: &str) -> Option<(String, &str)> {
    let mut acc = String::new();
    let mut chars = rest.char_indices();

    while let Some((index, ch)) = chars.next() {
        match ch {
            '"' => return Some((acc, &rest[index + 1..])),
            '\\' => match chars.clone().next() {
                Some((_, escaped @ ('"' | '\\'))) => {
                    acc.push(escaped);
                    chars.next();
                }
                _ => acc.push('\\'),
            },
            _ => acc.push(ch),
        }
    }

    // No closing quote on this line.
    None
}

/// One or more ASCII digits. `None` if there are none, or on overflow.
fn scan_number(text: &str) -> Option<(usize, &str)> {
    let digit_count = text.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        return None;
    }
    let value = text[..digit_count].parse::<usize>().ok()?;
    Some((value, &text[digit_count..]))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_stopped_in_location() {
        let it = find_latest_location("", "over\n*** STOPPED IN \"foo.scm\"@8.2\n");
        assert_eq!(it, Some(DiagnosticLocation::new("foo.scm", 7, 1)));
    }

    #[test]
    fn test_no_line_col_suffix() {
        assert_eq!(find_latest_location("", "*** ERROR IN \"foo.scm\"\n"), None);
        assert_eq!(find_latest_location("", "*** ERROR IN \"foo.scm\"@\n"), None);
        assert_eq!(find_latest_location("", "*** ERROR IN \"foo.scm\"@8\n"), None);
        assert_eq!(find_latest_location("", "*** ERROR IN \"foo.scm\"@8.\n"), None);
    }

    #[test]
    fn test_most_recent_match_wins() {
        let output = "\"a.scm\"@1.1 first\nnoise\n\"b.scm\"@2.2 second\n> ";
        assert_eq!(
            find_latest_location("", output),
            Some(DiagnosticLocation::new("b.scm", 1, 1))
        );
    }

    #[test]
    fn test_leftmost_match_within_a_line() {
        let output = "in \"a.scm\"@3.4 called from \"b.scm\"@5.6\n";
        assert_eq!(
            find_latest_location("", output),
            Some(DiagnosticLocation::new("a.scm", 2, 3))
        );
    }

    #[test]
    fn test_trailing_incomplete_line_is_ignored() {
        assert_eq!(find_latest_location("", "done\n\"a.scm\"@1.1"), None);
        // Without any newline nothing is scanned at all.
        assert_eq!(find_latest_location("", "\"a.scm\"@1.1"), None);
    }

    #[test]
    fn test_previous_last_row_completes_the_line() {
        // The location was printed in two chunks; the first is already on screen.
        let it = find_latest_location("*** ERROR IN \"lib/x.s", "cm\"@10.20 -- oops\n> ");
        assert_eq!(it, Some(DiagnosticLocation::new("lib/x.scm", 9, 19)));
    }

    #[test]
    fn test_filename_does_not_span_lines() {
        assert_eq!(find_latest_location("", "\"a\nb\"@1.1\n"), None);
    }

    #[test_case(r#""a\"b.scm"@1.2"# => Some(DiagnosticLocation::new("a\"b.scm", 0, 1)); "escaped quote")]
    #[test_case(r#""C:\src\a.scm"@4.4"# => Some(DiagnosticLocation::new(r"C:\src\a.scm", 3, 3)); "backslashes kept")]
    #[test_case(r#""a\\"@1.1"# => Some(DiagnosticLocation::new(r"a\", 0, 0)); "escaped backslash")]
    #[test_case(r#""""@1.1"# => Some(DiagnosticLocation::new("", 0, 0)); "empty filename")]
    #[test_case(r#""x"@0.0"# => Some(DiagnosticLocation::new("x", 0, 0)); "zero saturates")]
    #[test_case(r#""x" "y"@2.3"# => Some(DiagnosticLocation::new("y", 1, 2)); "first quote is not a match")]
    #[test_case(r#""x"@99999999999999999999999.1 "y"@1.1"# => Some(DiagnosticLocation::new("y", 0, 0)); "overflow skipped")]
    #[test_case(r#"no quotes@1.1"# => None; "no quotes")]
    #[test_case(r#""unterminated@1.1"# => None; "unterminated")]
    #[test_case(r#""x"@a.1"# => None; "letters")]
    fn test_scan_line(line: &str) -> Option<DiagnosticLocation> { scan_line(line) }

    #[test]
    fn test_display_is_one_based() {
        let it = DiagnosticLocation::new("foo.scm", 7, 1);
        assert_eq!(it.to_string(), "\"foo.scm\"@8.2");
        assert_eq!(it.row_col(), RowCol::new(7, 1));
    }

    #[test]
    fn test_display_escapes_like_the_scanner() {
        let it = DiagnosticLocation::new("a\"b\\λ\tc.scm", 0, 4);
        let text = it.to_string();
        assert_eq!(text, "\"a\\\"b\\\\λ\tc.scm\"@1.5");
        assert_eq!(scan_line(&text), Some(it));
    }
}
