// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Wrap the given value in `Ok(..)`, or return `Ok(())` when called with no arguments.
///
/// ```rust
/// use r3bl_repl_bridge::ok;
///
/// fn unit() -> miette::Result<()> { ok!() }
/// fn value() -> miette::Result<u8> { ok!(42) }
///
/// assert!(unit().is_ok());
/// assert_eq!(value().unwrap(), 42);
/// ```
#[macro_export]
macro_rules! ok {
    // No args.
    () => {
        Ok(())
    };
    // With arg.
    ($value:expr) => {
        Ok($value)
    };
}
