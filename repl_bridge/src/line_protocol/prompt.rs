// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Prompt grammar, eg: `> `, `? `, `2> `, `12\3> `.
//!
//! ```text
//! prompt := [ digits [ '\' digits ] ] ( '>' | '?' ) ' '
//! ```

/// Length in bytes of the prompt at the very start of `line`, if there is one.
#[must_use]
pub fn prompt_len(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let count_digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|it| it.is_ascii_digit())
            .count()
    };

    let mut index = count_digits(0);

    // The escaped depth is only allowed after a depth.
    if index > 0 && bytes.get(index) == Some(&b'\\') {
        let escaped = count_digits(index + 1);
        if escaped > 0 {
            index += 1 + escaped;
        }
    }

    match (bytes.get(index), bytes.get(index + 1)) {
        (Some(b'>' | b'?'), Some(b' ')) => Some(index + 2),
        _ => None,
    }
}

/// Removes the prompt prefix, or returns `line` unchanged if it doesn't start with one.
/// Prompts stacked by nested interpreter levels (eg, `> > `) are all removed, so
/// stripping twice gives the same result as stripping once.
#[must_use]
pub fn strip_prompt(line: &str) -> &str {
    let mut rest = line;
    while let Some(len) = prompt_len(rest) {
        rest = &rest[len..];
    }
    rest
}

/// Column (in chars) where the user's input starts on `line`.
#[must_use]
pub fn prompt_boundary_col(line: &str) -> usize {
    line.chars().count() - strip_prompt(line).chars().count()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("> (car x)" => "(car x)"; "plain prompt")]
    #[test_case("? y" => "y"; "question prompt")]
    #[test_case("2> ,b" => ",b"; "nesting depth")]
    #[test_case("12\\3> hello" => "hello"; "escaped depth")]
    #[test_case("no prompt here" => "no prompt here"; "no prompt")]
    #[test_case(">no space" => ">no space"; "missing space")]
    #[test_case("\\3> x" => "\\3> x"; "escape without depth")]
    #[test_case("12\\> x" => "12\\> x"; "escape without digits")]
    #[test_case("1 > x" => "1 > x"; "space before marker")]
    #[test_case("> " => ""; "empty input")]
    #[test_case(">  x" => " x"; "only one space is part of the prompt")]
    #[test_case("> > x" => "x"; "stacked prompts")]
    #[test_case("" => ""; "empty line")]
    #[test_case("x > y" => "x > y"; "prompt not at start")]
    fn test_strip_prompt(line: &str) -> &str { strip_prompt(line) }

    #[test]
    fn test_strip_prompt_is_idempotent() {
        let samples = [
            "> > > x",
            "1> 2> x",
            "12\\3> 4? ",
            "> ",
            "?  ",
            "🦀> x",
            "9\\9? \\9> ",
            "no prompt",
            "",
        ];
        for sample in samples {
            let once = strip_prompt(sample);
            assert_eq!(strip_prompt(once), once, "sample: {sample:?}");
        }
    }

    #[test]
    fn test_prompt_len_and_boundary() {
        assert_eq!(prompt_len("12\\3> hello"), Some(6));
        assert_eq!(prompt_len("hello"), None);
        assert_eq!(prompt_boundary_col("12\\3> hello"), 6);
        assert_eq!(prompt_boundary_col("λ"), 0);
    }
}
