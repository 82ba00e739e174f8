// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Runs a command line interpreter (by default Gambit's `gsi`) in a pseudo terminal,
//! as an [`InterpreterRuntime`].
//!
//! ```text
//! IoChannel ── idle: send ──► blocking writer task ──► PTY controller ──► interpreter
//!     ▲                                                                      │
//!     └── idle: drain ◄── unbounded channel ◄── blocking reader task ◄───────┘
//! ```
//!
//! A tick never does PTY I/O itself. Each tick hands the pending input to the writer
//! task, drains whatever the reader task has collected, and polls the child with
//! `try_wait`, then asks to be ticked again after
//! [`InterpreterConfig::poll_interval`]. A child that stops reading its input only
//! stalls the writer task.

use std::io::{Read, Write};

use portable_pty::{Child, ChildKiller, CommandBuilder, MasterPty, PtySize,
                   native_pty_system};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError,
                        unbounded_channel};
use tracing::{debug, trace, warn};

use crate::{BridgeConfig, IdleOutcome, InterpreterConfig, InterpreterRuntime, PullResult,
            RuntimeFactory, RuntimeIo, RuntimeSpawnError};

pub type Controller = Box<dyn MasterPty + Send>;
pub type ControlledChild = Box<dyn Child + Send + Sync>;

pub const READ_BUFFER_SIZE: usize = 4096;

/// `^C`, turned into `SIGINT` for the interpreter by the terminal line discipline.
pub const INTERRUPT_BYTE: u8 = 0x03;

/// `^D`, end of input for a line oriented reader.
pub const END_OF_INPUT_BYTE: u8 = 0x04;

/// Ticks to keep draining output after the child exits, in case the reader task is
/// still behind.
const EXIT_DRAIN_TICKS: u32 = 10;

/// Creates a [`PtyInterpreterRuntime`] for exactly one process kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtyRuntimeFactory {
    kind: String,
    config: InterpreterConfig,
}

impl PtyRuntimeFactory {
    pub fn new(kind: impl Into<String>, config: InterpreterConfig) -> Self {
        Self {
            kind: kind.into(),
            config,
        }
    }

    #[must_use]
    pub fn from_bridge_config(config: &BridgeConfig) -> Self {
        Self::new(&config.process_kind, config.interpreter.clone())
    }
}

impl RuntimeFactory for PtyRuntimeFactory {
    fn create(&self, kind: &str) -> Option<Box<dyn InterpreterRuntime>> {
        if kind != self.kind {
            return None;
        }
        Some(Box::new(PtyInterpreterRuntime::new(self.config.clone())))
    }
}

pub struct PtyInterpreterRuntime {
    config: InterpreterConfig,
    process: Option<PtyProcess>,
}

struct PtyProcess {
    /// Kept alive so the reader doesn't see EOF early.
    _controller: Controller,
    /// Feeds the writer task. Dropping it ends the task once its current write is done.
    input_sender: UnboundedSender<Vec<u8>>,
    child: ControlledChild,
    output_receiver: UnboundedReceiver<Vec<u8>>,
    /// Ticks since the child was seen to exit.
    exited_ticks: Option<u32>,
}

impl std::fmt::Debug for PtyInterpreterRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyInterpreterRuntime")
            .field("config", &self.config)
            .field("running", &self.process.is_some())
            .finish()
    }
}

impl PtyInterpreterRuntime {
    #[must_use]
    pub fn new(config: InterpreterConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    fn build_command(&self) -> Result<CommandBuilder, RuntimeSpawnError> {
        let cwd = match &self.config.cwd {
            Some(it) => it.clone(),
            None => std::env::current_dir().map_err(|e| RuntimeSpawnError::Spawn {
                command: self.config.command.clone(),
                details: format!("no current directory: {e}"),
            })?,
        };

        let mut command = CommandBuilder::new(&self.config.command);
        command.args(&self.config.args);
        command.cwd(cwd);
        // Keep the interpreter from emitting cursor movement and colors.
        command.env("TERM", "dumb");
        Ok(command)
    }

    fn spawn(&self) -> Result<PtyProcess, RuntimeSpawnError> {
        let command = self.build_command()?;
        let pty_pair = native_pty_system()
            .openpty(PtySize {
                rows: self.config.rows,
                cols: self.config.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| RuntimeSpawnError::OpenPty {
                details: e.to_string(),
            })?;

        let controller: Controller = pty_pair.master;
        let child: ControlledChild =
            pty_pair
                .slave
                .spawn_command(command)
                .map_err(|e| RuntimeSpawnError::Spawn {
                    command: self.config.command.clone(),
                    details: e.to_string(),
                })?;
        // The controlled side is dropped on return, so the reader sees EOF once the
        // child exits.

        configure_line_discipline(&controller, self.config.echo);

        let pty_io_error = |e: &dyn std::fmt::Display| RuntimeSpawnError::PtyIo {
            details: e.to_string(),
        };
        let reader = controller.try_clone_reader().map_err(|e| pty_io_error(&e))?;
        let writer = controller.take_writer().map_err(|e| pty_io_error(&e))?;
        let runtime_handle =
            tokio::runtime::Handle::try_current().map_err(|e| pty_io_error(&e))?;

        let (output_sender, output_receiver) = unbounded_channel();
        let _unused =
            runtime_handle.spawn_blocking(move || read_controller_output(reader, &output_sender));
        let (input_sender, input_receiver) = unbounded_channel();
        let _unused =
            runtime_handle.spawn_blocking(move || write_controller_input(writer, input_receiver));

        Ok(PtyProcess {
            _controller: controller,
            input_sender,
            child,
            output_receiver,
            exited_ticks: None,
        })
    }
}

/// Runs on a blocking thread until the PTY closes.
fn read_controller_output(
    mut reader: Box<dyn Read + Send>,
    output_sender: &UnboundedSender<Vec<u8>>,
) {
    let mut read_buffer = [0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut read_buffer) {
            // EOF, or EIO once the child side is closed.
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if output_sender.send(read_buffer[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
    debug!("pty reader task done");
}

/// Runs on a blocking thread until the sender is dropped or a write fails. A write
/// blocks while the interpreter isn't reading and the PTY's input buffer is full, and
/// fails once the child side of the PTY is closed.
fn write_controller_input(
    mut writer: Box<dyn Write + Send>,
    mut input_receiver: UnboundedReceiver<Vec<u8>>,
) {
    while let Some(bytes) = input_receiver.blocking_recv() {
        let result = writer.write_all(&bytes).and_then(|()| writer.flush());
        if let Err(error) = result {
            debug!(%error, len = bytes.len(), "pty write failed, writer task done");
            return;
        }
    }
    debug!("pty writer task done");
}

/// No `\r` before each `\n` of output, and no echo of input unless `echo`.
#[cfg(unix)]
fn configure_line_discipline(controller: &Controller, echo: bool) {
    use rustix::{fd::BorrowedFd,
                 termios::{self, LocalModes, OptionalActions, OutputModes}};

    let Some(raw_fd) = controller.as_raw_fd() else {
        return;
    };
    // SAFETY: `raw_fd` is owned by `controller`, which outlives this borrow.
    let fd = unsafe { BorrowedFd::borrow_raw(raw_fd) };

    let result = termios::tcgetattr(fd).and_then(|mut attrs| {
        attrs.output_modes.remove(OutputModes::ONLCR);
        if !echo {
            attrs.local_modes.remove(LocalModes::ECHO);
        }
        termios::tcsetattr(fd, OptionalActions::Now, &attrs)
    });
    if let Err(error) = result {
        warn!(%error, "could not configure pty line discipline");
    }
}

#[cfg(not(unix))]
fn configure_line_discipline(_controller: &Controller, _echo: bool) {}

impl PtyProcess {
    /// Never blocks.
    fn write(&self, bytes: Vec<u8>) {
        let len = bytes.len();
        if self.input_sender.send(bytes).is_err() {
            trace!(len, "pty writer task is gone, input dropped");
        }
    }

    /// Returns false once the reader task is done and everything it read was drained.
    fn drain_output(&mut self, io: &mut RuntimeIo<'_>) -> bool {
        loop {
            match self.output_receiver.try_recv() {
                Ok(chunk) => io.emit_output_bytes(&chunk),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn has_exited(&mut self) -> bool {
        if self.exited_ticks.is_some() {
            return true;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(?status, "interpreter exited");
                self.exited_ticks = Some(0);
                true
            }
            Ok(None) => false,
            Err(error) => {
                warn!(%error, "could not poll interpreter, treating it as exited");
                self.exited_ticks = Some(0);
                true
            }
        }
    }
}

impl InterpreterRuntime for PtyInterpreterRuntime {
    fn entry(&mut self) -> miette::Result<()> {
        let process = self.spawn()?;
        debug!(
            command = %self.config.command,
            args = ?self.config.args,
            pid = ?process.child.process_id(),
            "interpreter started"
        );
        self.process = Some(process);
        Ok(())
    }

    fn heartbeat(&mut self, io: &mut RuntimeIo<'_>) {
        if !io.take_interrupt() {
            return;
        }
        if let Some(process) = self.process.as_ref() {
            process.write(vec![INTERRUPT_BYTE]);
        }
    }

    fn idle(&mut self, io: &mut RuntimeIo<'_>) -> IdleOutcome {
        let Some(process) = self.process.as_mut() else {
            return IdleOutcome::Finished;
        };

        let mut pending = vec![];
        loop {
            match io.pull_input() {
                PullResult::Byte(byte) => pending.push(byte),
                PullResult::EndOfInput => pending.push(END_OF_INPUT_BYTE),
                PullResult::Empty => break,
            }
        }
        if !pending.is_empty() {
            process.write(pending);
        }

        let reader_alive = process.drain_output(io);
        if process.has_exited() {
            let ticks = process.exited_ticks.get_or_insert(0);
            *ticks += 1;
            if !reader_alive || *ticks > EXIT_DRAIN_TICKS {
                return IdleOutcome::Finished;
            }
        }

        IdleOutcome::Wait(self.config.poll_interval())
    }

    fn cleanup(&mut self) {
        let Some(PtyProcess {
            mut child,
            exited_ticks,
            ..
        }) = self.process.take()
        else {
            return;
        };
        if exited_ticks.is_none() {
            if let Err(error) = child.kill() {
                debug!(%error, "kill of interpreter failed, it may have exited");
            }
            reap(child);
        }
        debug!(command = %self.config.command, "interpreter cleaned up");
    }
}

/// Waits for a killed child on a blocking thread, so it doesn't linger as a zombie.
fn reap(mut child: ControlledChild) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime_handle) => {
            let _unused = runtime_handle.spawn_blocking(move || match child.wait() {
                Ok(status) => debug!(?status, "interpreter reaped"),
                Err(error) => warn!(%error, "could not reap interpreter"),
            });
        }
        Err(_) => {
            let _unused = child.try_wait();
        }
    }
}
