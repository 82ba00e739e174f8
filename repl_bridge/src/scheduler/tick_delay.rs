// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

/// Floor between two ticks of the same process, so a zero wait can't turn into a busy
/// loop that starves the event loop.
pub const MIN_TICK_DELAY: Duration = Duration::from_millis(1);

/// `max(1ms, round(wait in ms))`.
#[must_use]
pub fn tick_delay(wait: Duration) -> Duration {
    let millis = (wait.as_secs_f64() * 1000.0).round();
    // Float to int `as` casts saturate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let millis = millis as u64;
    Duration::from_millis(millis).max(MIN_TICK_DELAY)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0 => 1; "zero is floored")]
    #[test_case(400 => 1; "rounds down then floored")]
    #[test_case(600 => 1; "rounds up to one")]
    #[test_case(1_499 => 1; "just under one and a half")]
    #[test_case(1_500 => 2; "half rounds away from zero")]
    #[test_case(10_000 => 10; "ten ms")]
    #[test_case(20_000 => 20; "twenty ms")]
    #[test_case(2_000_000 => 2_000; "two seconds")]
    fn test_tick_delay_millis(wait_micros: u64) -> u128 {
        tick_delay(Duration::from_micros(wait_micros)).as_millis()
    }

    #[test]
    fn test_huge_wait_does_not_panic() {
        assert!(tick_delay(Duration::MAX) > Duration::from_secs(1));
    }
}
