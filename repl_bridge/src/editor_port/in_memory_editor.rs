// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`HeadlessEditor`] is a complete [`crate::EditorHost`] that keeps everything in
//! memory: buffers are rows of text, and frames are a vertical stack. The `rbridge`
//! binary uses it with an echo sink that prints interpreter output, and the tests use it
//! to observe exactly what the bridge did to the buffers and the layout.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use tracing::trace;

use super::{BufferEvents, BufferId, BufferText, FileOpener, FrameId, LocalBoxFuture,
            OnDeleteCallback, RowCol, SubscriptionId, ViewCoordinator};

pub const SCRATCH_BUFFER_NAME: &str = "*scratch*";

/// Receives every chunk of text passed to [`BufferText::append_text`].
pub type EchoSink = Box<dyn FnMut(BufferId, &str)>;

#[derive(Debug)]
struct HeadlessBuffer {
    id: BufferId,
    name: String,
    /// Never empty.
    rows: Vec<String>,
    caret: RowCol,
    dirty: bool,
}

impl HeadlessBuffer {
    fn new(id: BufferId, name: &str, content: &str) -> Self {
        let mut it = Self {
            id,
            name: name.to_string(),
            rows: vec![],
            caret: RowCol::default(),
            dirty: false,
        };
        it.set_text(content);
        it
    }

    fn text(&self) -> String { self.rows.join("\n") }

    fn set_text(&mut self, text: &str) {
        self.rows = text.split('\n').map(String::from).collect();
    }

    fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, |it| it.chars().count())
    }

    fn end_of_buffer(&self) -> RowCol {
        let row = self.rows.len() - 1;
        RowCol::new(row, self.row_len(row))
    }

    fn clamp(&self, pos: RowCol) -> RowCol {
        let row = pos.row.min(self.rows.len() - 1);
        RowCol::new(row, pos.col.min(self.row_len(row)))
    }

    /// The position one char after `pos`, where the end of a row steps to the start of
    /// the next one. The end of the buffer stays put.
    fn next_pos(&self, pos: RowCol) -> RowCol {
        let pos = self.clamp(pos);
        if pos.col < self.row_len(pos.row) {
            RowCol::new(pos.row, pos.col + 1)
        } else if pos.row + 1 < self.rows.len() {
            RowCol::new(pos.row + 1, 0)
        } else {
            pos
        }
    }

    /// Replace `[start, end)` with `text`. Returns the position just after the inserted
    /// text. Only the rows from `start` to `end` are rebuilt.
    fn splice(&mut self, start: RowCol, end: RowCol, text: &str) -> RowCol {
        let start = self.clamp(start);
        let end = self.clamp(end).max(start);

        let head = &self.rows[start.row][..byte_index(&self.rows[start.row], start.col)];
        let tail = &self.rows[end.row][byte_index(&self.rows[end.row], end.col)..];

        let mut new_rows: Vec<String> = text.split('\n').map(String::from).collect();
        let last = new_rows.len() - 1;
        let caret = if last == 0 {
            RowCol::new(start.row, start.col + new_rows[0].chars().count())
        } else {
            RowCol::new(start.row + last, new_rows[last].chars().count())
        };
        new_rows[0].insert_str(0, head);
        new_rows[last].push_str(tail);

        drop(self.rows.splice(start.row..=end.row, new_rows));
        caret
    }
}

fn byte_index(row: &str, col: usize) -> usize {
    row.char_indices().nth(col).map_or(row.len(), |(index, _)| index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessFrame {
    pub id: FrameId,
    pub buffer: BufferId,
    /// Share of the editor's height.
    pub height_percent: u16,
}

struct Subscription {
    id: SubscriptionId,
    buffer: BufferId,
    callback: OnDeleteCallback,
}

#[derive(Default)]
struct HeadlessEditorState {
    next_id: u32,
    /// In creation order, which is also the order for
    /// [`ViewCoordinator::switch_to_next_buffer`].
    buffers: Vec<HeadlessBuffer>,
    /// Top to bottom.
    frames: Vec<HeadlessFrame>,
    active_frame: Option<FrameId>,
    subscriptions: Vec<Subscription>,
    files: HashMap<String, String>,
}

impl HeadlessEditorState {
    fn mint(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn buffer(&self, id: BufferId) -> Option<&HeadlessBuffer> {
        self.buffers.iter().find(|it| it.id == id)
    }

    fn buffer_mut(&mut self, id: BufferId) -> Option<&mut HeadlessBuffer> {
        self.buffers.iter_mut().find(|it| it.id == id)
    }

    fn find_buffer(&self, name: &str) -> Option<BufferId> {
        self.buffers.iter().find(|it| it.name == name).map(|it| it.id)
    }

    fn create_buffer(&mut self, name: &str, content: &str) -> BufferId {
        let id = BufferId(self.mint());
        self.buffers.push(HeadlessBuffer::new(id, name, content));
        id
    }

    fn frame_mut(&mut self, id: FrameId) -> Option<&mut HeadlessFrame> {
        self.frames.iter_mut().find(|it| it.id == id)
    }

    fn active_frame_mut(&mut self) -> Option<&mut HeadlessFrame> {
        let active = self.active_frame?;
        self.frame_mut(active)
    }
}

/// In-memory [`crate::EditorHost`]. Cloning gives another handle to the same editor.
#[derive(Clone)]
pub struct HeadlessEditor {
    state: Rc<RefCell<HeadlessEditorState>>,
    echo_sink: Rc<RefCell<Option<EchoSink>>>,
}

impl Default for HeadlessEditor {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for HeadlessEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HeadlessEditor")
            .field("buffers", &state.buffers)
            .field("frames", &state.frames)
            .field("active_frame", &state.active_frame)
            .finish_non_exhaustive()
    }
}

impl HeadlessEditor {
    /// Starts with one frame showing an empty [`SCRATCH_BUFFER_NAME`] buffer.
    #[must_use]
    pub fn new() -> Self {
        let mut state = HeadlessEditorState::default();
        let scratch = state.create_buffer(SCRATCH_BUFFER_NAME, "");
        let frame = FrameId(state.mint());
        state.frames.push(HeadlessFrame {
            id: frame,
            buffer: scratch,
            height_percent: 100,
        });
        state.active_frame = Some(frame);

        Self {
            state: Rc::new(RefCell::new(state)),
            echo_sink: Rc::new(RefCell::new(None)),
        }
    }

    #[must_use]
    pub fn with_echo_sink(self, sink: EchoSink) -> Self {
        self.echo_sink.replace(Some(sink));
        self
    }

    /// Make `name` openable without touching the real filesystem.
    #[must_use]
    pub fn with_file(self, name: &str, content: &str) -> Self {
        self.add_file(name, content);
        self
    }

    pub fn add_file(&self, name: &str, content: &str) {
        self.state
            .borrow_mut()
            .files
            .insert(name.to_string(), content.to_string());
    }

    /// Create a buffer with `content`, without showing it.
    pub fn create_buffer_with_text(&self, name: &str, content: &str) -> BufferId {
        self.state.borrow_mut().create_buffer(name, content)
    }

    /// Insert `text` at the caret, like a user typing. Unlike
    /// [`BufferText::append_text`] this isn't echoed.
    pub fn type_text(&self, buffer: BufferId, text: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(it) = state.buffer_mut(buffer) {
            let caret = it.caret;
            it.caret = it.splice(caret, caret, text);
            it.dirty = true;
        }
    }

    #[must_use]
    pub fn buffer_text(&self, buffer: BufferId) -> Option<String> {
        self.state.borrow().buffer(buffer).map(HeadlessBuffer::text)
    }

    /// Returns whether the buffer was marked dirty, and clears the mark.
    pub fn take_dirty(&self, buffer: BufferId) -> bool {
        self.state
            .borrow_mut()
            .buffer_mut(buffer)
            .is_some_and(|it| std::mem::take(&mut it.dirty))
    }

    /// The frame stack, top to bottom.
    #[must_use]
    pub fn frames(&self) -> Vec<HeadlessFrame> { self.state.borrow().frames.clone() }

    #[must_use]
    pub fn subscription_count(&self) -> usize { self.state.borrow().subscriptions.len() }

    /// Remove the buffer, then notify its on-delete subscribers. Frames that showed it
    /// switch to another buffer.
    pub fn delete_buffer(&self, buffer: BufferId) {
        let callbacks: Vec<OnDeleteCallback> = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.buffers.iter().position(|it| it.id == buffer) else {
                return;
            };
            state.buffers.remove(index);
            if state.buffers.is_empty() {
                state.create_buffer(SCRATCH_BUFFER_NAME, "");
            }
            let fallback = state.buffers[index.min(state.buffers.len() - 1)].id;
            for frame in state.frames.iter_mut().filter(|it| it.buffer == buffer) {
                frame.buffer = fallback;
            }

            let (matching, remaining): (Vec<_>, Vec<_>) =
                std::mem::take(&mut state.subscriptions)
                    .into_iter()
                    .partition(|it| it.buffer == buffer);
            state.subscriptions = remaining;
            matching.into_iter().map(|it| it.callback).collect()
        };

        trace!(%buffer, subscribers = callbacks.len(), "buffer deleted");
        for callback in callbacks {
            callback(buffer);
        }
    }
}

impl BufferText for HeadlessEditor {
    fn row_count(&self, buffer: BufferId) -> usize {
        self.state.borrow().buffer(buffer).map_or(0, |it| it.rows.len())
    }

    fn row(&self, buffer: BufferId, row: usize) -> Option<String> {
        self.state.borrow().buffer(buffer)?.rows.get(row).cloned()
    }

    fn caret(&self, buffer: BufferId) -> RowCol {
        self.state
            .borrow()
            .buffer(buffer)
            .map_or(RowCol::default(), |it| it.caret)
    }

    fn end_of_buffer(&self, buffer: BufferId) -> RowCol {
        self.state
            .borrow()
            .buffer(buffer)
            .map_or(RowCol::default(), HeadlessBuffer::end_of_buffer)
    }

    fn replace_range(&self, buffer: BufferId, start: RowCol, end: RowCol, text: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(it) = state.buffer_mut(buffer) {
            it.caret = it.splice(start, end, text);
            it.dirty = true;
        }
    }

    fn append_text(&self, buffer: BufferId, text: &str) {
        {
            let mut state = self.state.borrow_mut();
            let Some(it) = state.buffer_mut(buffer) else {
                return;
            };
            let end = it.end_of_buffer();
            it.caret = it.splice(end, end, text);
            it.dirty = true;
        }

        if let Some(sink) = self.echo_sink.borrow_mut().as_mut() {
            sink(buffer, text);
        }
    }

    fn move_caret_to_end(&self, buffer: BufferId) {
        if let Some(it) = self.state.borrow_mut().buffer_mut(buffer) {
            it.caret = it.end_of_buffer();
        }
    }

    fn delete_char(&self, buffer: BufferId) {
        let mut state = self.state.borrow_mut();
        if let Some(it) = state.buffer_mut(buffer) {
            let caret = it.clamp(it.caret);
            let next = it.next_pos(caret);
            if next != caret {
                it.caret = it.splice(caret, next, "");
                it.dirty = true;
            }
        }
    }

    fn goto(&self, buffer: BufferId, pos: RowCol) {
        if let Some(it) = self.state.borrow_mut().buffer_mut(buffer) {
            it.caret = it.clamp(pos);
        }
    }
}

impl ViewCoordinator for HeadlessEditor {
    fn find_buffer(&self, name: &str) -> Option<BufferId> {
        self.state.borrow().find_buffer(name)
    }

    fn buffer_name(&self, buffer: BufferId) -> Option<String> {
        self.state.borrow().buffer(buffer).map(|it| it.name.clone())
    }

    fn create_buffer(&self, name: &str) -> BufferId {
        self.state.borrow_mut().create_buffer(name, "")
    }

    fn active_frame(&self) -> FrameId {
        let state = self.state.borrow();
        state
            .active_frame
            .or_else(|| state.frames.first().map(|it| it.id))
            .unwrap_or(FrameId(0))
    }

    fn active_buffer(&self) -> Option<BufferId> {
        let state = self.state.borrow();
        let active = state.active_frame?;
        state
            .frames
            .iter()
            .find(|it| it.id == active)
            .map(|it| it.buffer)
    }

    fn buffer_frames(&self, buffer: BufferId) -> Vec<FrameId> {
        self.state
            .borrow()
            .frames
            .iter()
            .filter(|it| it.buffer == buffer)
            .map(|it| it.id)
            .collect()
    }

    fn set_active_frame(&self, frame: FrameId) {
        let mut state = self.state.borrow_mut();
        if state.frames.iter().any(|it| it.id == frame) {
            state.active_frame = Some(frame);
        }
    }

    fn delete_other_frames(&self, frame: FrameId) {
        let mut state = self.state.borrow_mut();
        if !state.frames.iter().any(|it| it.id == frame) {
            return;
        }
        state.frames.retain(|it| it.id == frame);
        if let Some(it) = state.frames.first_mut() {
            it.height_percent = 100;
        }
        state.active_frame = Some(frame);
    }

    fn split_frame_vertically(&self, frame: FrameId, top_percent: u16) -> FrameId {
        let mut state = self.state.borrow_mut();
        let Some(index) = state.frames.iter().position(|it| it.id == frame) else {
            return frame;
        };
        let new_id = FrameId(state.mint());
        let top = &mut state.frames[index];
        let total = top.height_percent;
        let top_height = total * top_percent.min(100) / 100;
        top.height_percent = top_height;
        let below = HeadlessFrame {
            id: new_id,
            buffer: top.buffer,
            height_percent: total - top_height,
        };
        state.frames.insert(index + 1, below);
        new_id
    }

    fn show_buffer(&self, frame: FrameId, buffer: BufferId) {
        let mut state = self.state.borrow_mut();
        if state.buffer(buffer).is_none() {
            return;
        }
        if let Some(it) = state.frame_mut(frame) {
            it.buffer = buffer;
        }
    }

    fn switch_to_buffer(&self, buffer: BufferId) {
        let mut state = self.state.borrow_mut();
        if state.buffer(buffer).is_none() {
            return;
        }
        if let Some(it) = state.active_frame_mut() {
            it.buffer = buffer;
        }
    }

    fn switch_to_next_buffer(&self) {
        let mut state = self.state.borrow_mut();
        let Some(current) = state.active_frame_mut().map(|it| it.buffer) else {
            return;
        };
        let count = state.buffers.len();
        let index = state.buffers.iter().position(|it| it.id == current);
        let next = state.buffers[index.map_or(0, |it| (it + 1) % count)].id;
        if let Some(it) = state.active_frame_mut() {
            it.buffer = next;
        }
    }
}

impl FileOpener for HeadlessEditor {
    /// Preloaded files (see [`HeadlessEditor::with_file`]) win over the filesystem.
    fn open_file(&self, name: &str) -> LocalBoxFuture<Option<BufferId>> {
        let state = Rc::clone(&self.state);
        let name = name.to_string();
        let preloaded = state.borrow().files.get(&name).cloned();

        Box::pin(async move {
            let content = match preloaded {
                Some(it) => it,
                None => match tokio::fs::read_to_string(&name).await {
                    Ok(it) => it,
                    Err(error) => {
                        trace!(%name, %error, "open_file failed");
                        return None;
                    }
                },
            };

            let mut state = state.borrow_mut();
            // Someone else may have opened it while this was reading.
            let buffer = match state.find_buffer(&name) {
                Some(it) => it,
                None => state.create_buffer(&name, &content),
            };
            Some(buffer)
        })
    }
}

impl BufferEvents for HeadlessEditor {
    fn subscribe_on_delete(
        &self,
        buffer: BufferId,
        callback: OnDeleteCallback,
    ) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.mint());
        state.subscriptions.push(Subscription {
            id,
            buffer,
            callback,
        });
        id
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        self.state
            .borrow_mut()
            .subscriptions
            .retain(|it| it.id != subscription);
    }
}
