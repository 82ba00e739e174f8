// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

use crate::{IoChannel, PullResult};

/// What a runtime reports at the end of [`InterpreterRuntime::idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOutcome {
    /// Nothing to do for this long (it may be zero).
    Wait(Duration),
    /// The interpreter has exited.
    Finished,
}

impl IdleOutcome {
    /// Negative (or NaN) means finished. A wait too long for [`Duration`] is clamped.
    #[must_use]
    pub fn from_wait_secs(wait_secs: f64) -> Self {
        if wait_secs.is_nan() || wait_secs < 0.0 {
            return IdleOutcome::Finished;
        }
        IdleOutcome::Wait(Duration::try_from_secs_f64(wait_secs).unwrap_or(Duration::MAX))
    }
}

/// The only way a runtime talks to the bridge during a tick.
#[derive(Debug)]
pub struct RuntimeIo<'a> {
    channel: &'a mut IoChannel,
    interrupt_requested: &'a mut bool,
}

impl<'a> RuntimeIo<'a> {
    pub fn new(channel: &'a mut IoChannel, interrupt_requested: &'a mut bool) -> Self {
        Self {
            channel,
            interrupt_requested,
        }
    }

    /// Non-blocking.
    pub fn pull_input(&mut self) -> PullResult { self.channel.pull_input() }

    pub fn emit_output(&mut self, byte: u8) { self.channel.emit_output(byte); }

    pub fn emit_output_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.channel.emit_output(*byte);
        }
    }

    /// Returns whether an interrupt was requested since the last call, and clears it.
    pub fn take_interrupt(&mut self) -> bool { std::mem::take(self.interrupt_requested) }
}

/// An embedded interpreter, driven one slice at a time by the scheduler. None of these
/// methods may block.
pub trait InterpreterRuntime {
    /// Called once by `start`, before the first tick. An error here terminates the
    /// process without ticking it.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter can't be launched.
    fn entry(&mut self) -> miette::Result<()>;

    /// First thing in every tick. This is where a pending interrupt is noticed.
    fn heartbeat(&mut self, io: &mut RuntimeIo<'_>);

    /// Run until the interpreter would next need to wait.
    fn idle(&mut self, io: &mut RuntimeIo<'_>) -> IdleOutcome;

    /// Release resources. Called once, after [`IdleOutcome::Finished`] or on kill.
    fn cleanup(&mut self);
}

/// Creates the runtime for a process kind.
pub trait RuntimeFactory {
    /// `None` means the kind is not supported.
    fn create(&self, kind: &str) -> Option<Box<dyn InterpreterRuntime>>;
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(-1.0 => IdleOutcome::Finished; "negative")]
    #[test_case(-0.001 => IdleOutcome::Finished; "small negative")]
    #[test_case(f64::NAN => IdleOutcome::Finished; "nan")]
    #[test_case(0.0 => IdleOutcome::Wait(Duration::ZERO); "zero")]
    #[test_case(0.25 => IdleOutcome::Wait(Duration::from_millis(250)); "quarter second")]
    #[test_case(f64::INFINITY => IdleOutcome::Wait(Duration::MAX); "forever")]
    fn test_from_wait_secs(wait_secs: f64) -> IdleOutcome {
        IdleOutcome::from_wait_secs(wait_secs)
    }

    #[test]
    fn test_runtime_io() {
        let mut channel = IoChannel::new();
        let mut interrupt_requested = true;
        channel.push_input("q".into());

        let mut io = RuntimeIo::new(&mut channel, &mut interrupt_requested);
        assert!(io.take_interrupt());
        assert!(!io.take_interrupt());
        assert_eq!(io.pull_input(), PullResult::Byte(b'q'));
        assert_eq!(io.pull_input(), PullResult::Empty);
        io.emit_output_bytes(b"ok");

        assert_eq!(channel.take_output(), Some("ok".to_string()));
        assert!(!interrupt_requested);
    }
}
