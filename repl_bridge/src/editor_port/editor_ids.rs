// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Display, Formatter, Result};

/// Opaque id for an editor buffer, minted by the [`crate::EditorHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// Opaque id for a frame (a view onto one buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u32);

/// Returned by [`crate::BufferEvents::subscribe_on_delete`]; pass it back to
/// unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u32);

/// 0-based position in a buffer. `col` counts `char`s, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RowCol {
    pub row: usize,
    pub col: usize,
}

impl RowCol {
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self { Self { row, col } }
}

impl Display for BufferId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result { write!(f, "buffer#{}", self.0) }
}

impl Display for FrameId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result { write!(f, "frame#{}", self.0) }
}

impl Display for RowCol {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "[row: {}, col: {}]", self.row, self.col)
    }
}
