// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The byte oriented, order preserving channel between the editor and an interpreter.
//! The editor pushes input with [`IoChannel::push_input`], the interpreter runtime pulls
//! it one unit at a time, and emits output bytes which are decoded into text and
//! delivered once per scheduler tick.

// Attach.
mod input_queue;
mod io_channel_impl;
mod output_decoder;

// Re-export.
pub use input_queue::*;
pub use io_channel_impl::*;
pub use output_decoder::*;
