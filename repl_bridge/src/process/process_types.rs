// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Display, Formatter, Result};

/// Names one running interpreter instance. Never reused while still registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessHandle(pub u32);

impl Display for ProcessHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result { write!(f, "process#{}", self.0) }
}

/// ```text
/// Created ──start──► Running ──finished──► Terminated
///    │                  │                      ▲
///    └──────────────────┴───────kill───────────┘ (and the record is removed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ProcessState {
    #[strum(serialize = "created")]
    Created,
    #[strum(serialize = "running")]
    Running,
    #[strum(serialize = "terminated")]
    Terminated,
}
