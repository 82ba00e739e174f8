// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{future::Future, pin::Pin};

use super::{BufferId, FrameId, RowCol, SubscriptionId};

/// Row/column addressed text access. Every method takes `&self`: a host is shared
/// between the session, its scheduler tasks, and deletion callbacks, so it uses interior
/// mutability.
///
/// Operations on a buffer that doesn't exist are no-ops.
pub trait BufferText {
    fn row_count(&self, buffer: BufferId) -> usize;

    fn row(&self, buffer: BufferId, row: usize) -> Option<String>;

    fn caret(&self, buffer: BufferId) -> RowCol;

    fn end_of_buffer(&self, buffer: BufferId) -> RowCol;

    /// Replace the text between `start` (inclusive) and `end` (exclusive) with `text`.
    fn replace_range(&self, buffer: BufferId, start: RowCol, end: RowCol, text: &str);

    /// Insert at the end of the buffer, move the caret there, and mark the buffer
    /// dirty for redraw.
    fn append_text(&self, buffer: BufferId, text: &str);

    fn move_caret_to_end(&self, buffer: BufferId);

    /// Delete the char at the caret (joins rows when the caret is at the end of a row).
    fn delete_char(&self, buffer: BufferId);

    fn goto(&self, buffer: BufferId, pos: RowCol);

    /// Last row of the buffer, or empty when the buffer doesn't exist.
    fn last_row(&self, buffer: BufferId) -> String {
        let row_count = self.row_count(buffer);
        if row_count == 0 {
            return String::new();
        }
        self.row(buffer, row_count - 1).unwrap_or_default()
    }
}

/// Frame layout and buffer visibility.
pub trait ViewCoordinator {
    fn find_buffer(&self, name: &str) -> Option<BufferId>;

    fn buffer_name(&self, buffer: BufferId) -> Option<String>;

    fn create_buffer(&self, name: &str) -> BufferId;

    fn active_frame(&self) -> FrameId;

    fn active_buffer(&self) -> Option<BufferId>;

    /// Frames currently showing `buffer`, top to bottom. Empty if it isn't visible.
    fn buffer_frames(&self, buffer: BufferId) -> Vec<FrameId>;

    fn set_active_frame(&self, frame: FrameId);

    /// Close every frame except `frame`.
    fn delete_other_frames(&self, frame: FrameId);

    /// Split `frame` so that it keeps `top_percent` of its height. Returns the new frame
    /// below it, which shows the same buffer. The active frame doesn't change.
    fn split_frame_vertically(&self, frame: FrameId, top_percent: u16) -> FrameId;

    fn show_buffer(&self, frame: FrameId, buffer: BufferId);

    /// Show `buffer` in the active frame.
    fn switch_to_buffer(&self, buffer: BufferId);

    fn switch_to_next_buffer(&self);
}

/// A future that stays on the editor's thread.
pub type LocalBoxFuture<T> = Pin<Box<dyn Future<Output = T> + 'static>>;

/// Opening files can take a while (eg, a network filesystem); the bridge never blocks
/// on it.
pub trait FileOpener {
    /// Resolves to the buffer visiting `name`, or `None` if the file can't be opened.
    fn open_file(&self, name: &str) -> LocalBoxFuture<Option<BufferId>>;
}

pub type OnDeleteCallback = Box<dyn FnOnce(BufferId)>;

/// Observer subscription for buffer deletion.
pub trait BufferEvents {
    fn subscribe_on_delete(
        &self,
        buffer: BufferId,
        callback: OnDeleteCallback,
    ) -> SubscriptionId;

    /// Must be safe to call from inside an [`OnDeleteCallback`], and for an id that is
    /// already gone.
    fn unsubscribe(&self, subscription: SubscriptionId);
}

/// Everything the bridge needs from an editor.
pub trait EditorHost: BufferText + ViewCoordinator + FileOpener + BufferEvents {}

impl<T> EditorHost for T where T: BufferText + ViewCoordinator + FileOpener + BufferEvents {}
