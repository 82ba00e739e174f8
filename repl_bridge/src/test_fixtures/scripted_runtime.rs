// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! An [`InterpreterRuntime`] that replays a script instead of running an interpreter,
//! and records everything the scheduler did to it in a shared [`TickLog`].

use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

use tokio::time::Instant;

use crate::{IdleOutcome, InterpreterRuntime, PullResult, RuntimeFactory, RuntimeIo};

pub type TickLog = Rc<RefCell<TickRecord>>;

/// Answers one complete input line (without its `\n`) with some output.
pub type Responder = Box<dyn FnMut(&str) -> String>;

#[derive(Debug, Default)]
pub struct TickRecord {
    pub entries: u64,
    pub heartbeats: u64,
    pub interrupts: u64,
    pub cleanups: u64,
    /// When each [`InterpreterRuntime::idle`] call happened.
    pub idle_instants: Vec<Instant>,
    /// Every input byte pulled, in order.
    pub input: Vec<u8>,
    pub end_of_input_count: u64,
}

/// Replays `waits` (in seconds, negative means finished) from successive
/// [`InterpreterRuntime::idle`] calls, then finishes. See the `with_*` methods for
/// scripted output, input handling, and entry failure.
pub struct ScriptedRuntime {
    waits: VecDeque<f64>,
    /// Wait used once `waits` runs out. `None` finishes instead.
    idle_forever: Option<Duration>,
    /// Emitted by successive idle calls, one entry per call.
    outputs: VecDeque<Vec<u8>>,
    responder: Option<Responder>,
    finish_on_end_of_input: bool,
    fail_entry: bool,
    pending_line: Vec<u8>,
    finishing: bool,
    log: TickLog,
}

impl std::fmt::Debug for ScriptedRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRuntime")
            .field("waits", &self.waits)
            .field("idle_forever", &self.idle_forever)
            .field("outputs", &self.outputs.len())
            .field("has_responder", &self.responder.is_some())
            .finish_non_exhaustive()
    }
}

impl ScriptedRuntime {
    #[must_use]
    pub fn new(waits: Vec<f64>) -> Self {
        Self {
            waits: waits.into(),
            idle_forever: None,
            outputs: VecDeque::new(),
            responder: None,
            finish_on_end_of_input: false,
            fail_entry: false,
            pending_line: vec![],
            finishing: false,
            log: TickLog::default(),
        }
    }

    /// Keeps ticking every `wait` until it sees end of input (or is killed).
    #[must_use]
    pub fn interactive(wait: Duration) -> Self {
        let mut it = Self::new(vec![]);
        it.idle_forever = Some(wait);
        it.finish_on_end_of_input = true;
        it
    }

    /// Emit these chunks from the first idle calls, one per call. Chunks are raw bytes,
    /// so a multi-byte char can be split across ticks.
    #[must_use]
    pub fn with_outputs(mut self, outputs: Vec<Vec<u8>>) -> Self {
        self.outputs = outputs.into();
        self
    }

    #[must_use]
    pub fn with_responder(mut self, responder: Responder) -> Self {
        self.responder = Some(responder);
        self
    }

    #[must_use]
    pub fn with_failing_entry(mut self) -> Self {
        self.fail_entry = true;
        self
    }

    #[must_use]
    pub fn tick_log(&self) -> TickLog { Rc::clone(&self.log) }

    fn drain_input(&mut self, io: &mut RuntimeIo<'_>) {
        loop {
            match io.pull_input() {
                PullResult::Empty => return,
                PullResult::EndOfInput => {
                    self.log.borrow_mut().end_of_input_count += 1;
                    if self.finish_on_end_of_input {
                        self.finishing = true;
                    }
                }
                PullResult::Byte(byte) => {
                    self.log.borrow_mut().input.push(byte);
                    if byte == b'\n' {
                        let line = std::mem::take(&mut self.pending_line);
                        if let Some(responder) = self.responder.as_mut() {
                            let reply = responder(&String::from_utf8_lossy(&line));
                            io.emit_output_bytes(reply.as_bytes());
                        }
                    } else {
                        self.pending_line.push(byte);
                    }
                }
            }
        }
    }
}

impl InterpreterRuntime for ScriptedRuntime {
    fn entry(&mut self) -> miette::Result<()> {
        self.log.borrow_mut().entries += 1;
        if self.fail_entry {
            miette::bail!("scripted entry failure");
        }
        Ok(())
    }

    fn heartbeat(&mut self, io: &mut RuntimeIo<'_>) {
        let mut log = self.log.borrow_mut();
        log.heartbeats += 1;
        if io.take_interrupt() {
            log.interrupts += 1;
        }
    }

    fn idle(&mut self, io: &mut RuntimeIo<'_>) -> IdleOutcome {
        self.log.borrow_mut().idle_instants.push(Instant::now());

        if let Some(chunk) = self.outputs.pop_front() {
            io.emit_output_bytes(&chunk);
        }
        self.drain_input(io);

        if self.finishing {
            return IdleOutcome::Finished;
        }
        match (self.waits.pop_front(), self.idle_forever) {
            (Some(wait), _) => IdleOutcome::from_wait_secs(wait),
            (None, Some(wait)) => IdleOutcome::Wait(wait),
            (None, None) => IdleOutcome::Finished,
        }
    }

    fn cleanup(&mut self) { self.log.borrow_mut().cleanups += 1; }
}

/// Supports exactly one process kind. Every runtime it creates shares one
/// [`TickLog`].
pub struct ScriptedRuntimeFactory {
    kind: String,
    make: Box<dyn Fn() -> ScriptedRuntime>,
    log: TickLog,
}

impl std::fmt::Debug for ScriptedRuntimeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRuntimeFactory")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl ScriptedRuntimeFactory {
    pub fn new(kind: &str, make: impl Fn() -> ScriptedRuntime + 'static) -> Self {
        Self {
            kind: kind.to_string(),
            make: Box::new(make),
            log: TickLog::default(),
        }
    }

    #[must_use]
    pub fn tick_log(&self) -> TickLog { Rc::clone(&self.log) }
}

impl RuntimeFactory for ScriptedRuntimeFactory {
    fn create(&self, kind: &str) -> Option<Box<dyn InterpreterRuntime>> {
        if kind != self.kind {
            return None;
        }
        let mut runtime = (self.make)();
        runtime.log = Rc::clone(&self.log);
        Some(Box::new(runtime))
    }
}
