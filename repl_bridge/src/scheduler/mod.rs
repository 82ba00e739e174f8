// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Cooperative scheduling of interpreter runtimes. Each running process gets one local
//! task on a [`tokio::task::LocalSet`], which runs [`run_tick_loop`]: a tick delivers a
//! heartbeat, lets the runtime run until it would wait, flushes its output, and then
//! sleeps for [`tick_delay`]. Ticks of the same process never overlap.

// Attach.
mod interpreter_runtime;
mod tick_delay;
mod tick_loop;

// Re-export.
pub use interpreter_runtime::*;
pub use tick_delay::*;
pub use tick_loop::*;
