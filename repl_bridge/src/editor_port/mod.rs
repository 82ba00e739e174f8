// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The editor capabilities the bridge consumes. The bridge never renders, never edits
//! history, and never lays out frames itself; it asks an [`EditorHost`] to do so.

// Attach.
mod editor_ids;
mod editor_traits;
mod in_memory_editor;

// Re-export.
pub use editor_ids::*;
pub use editor_traits::*;
pub use in_memory_editor::*;
