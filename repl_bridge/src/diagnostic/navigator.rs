// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Brings a reported location into view next to the REPL buffer.
//!
//! ```text
//! ┌──────────────────────┐
//! │ target file          │ 100 - split_percent
//! │   ▲ caret at line.col│
//! ├──────────────────────┤
//! │ REPL buffer          │ split_percent
//! └──────────────────────┘
//! ```
//!
//! The layout is only rebuilt like this when the target or the REPL buffer isn't
//! visible already. Focus goes back to the frame that had it.

use std::rc::Rc;

use tokio::task::{JoinHandle, LocalSet};
use tracing::debug;

use super::DiagnosticLocation;
use crate::{BufferId, BufferText, EditorHost, FrameId, RowCol, ViewCoordinator};

/// Layout state captured when a location is found, before any async file open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinpointRequest {
    pub shell_buffer: BufferId,
    pub active_frame: FrameId,
    pub shell_frames: Vec<FrameId>,
    pub split_percent: u16,
}

impl PinpointRequest {
    pub fn capture(
        view: &impl ViewCoordinator,
        shell_buffer: BufferId,
        split_percent: u16,
    ) -> Self {
        Self {
            shell_buffer,
            active_frame: view.active_frame(),
            shell_frames: view.buffer_frames(shell_buffer),
            split_percent: split_percent.min(100),
        }
    }

    /// Move the caret of `target` to `pos`, showing it above the REPL buffer if either
    /// of them isn't visible. `target_frames` is where `target` was visible when the
    /// location was found (empty for a file that had to be opened).
    pub fn pinpoint<H>(&self, host: &H, target: BufferId, target_frames: &[FrameId], pos: RowCol)
    where
        H: BufferText + ViewCoordinator,
    {
        let mut restore_frame = self.active_frame;

        if target_frames.is_empty() || self.shell_frames.is_empty() {
            let top = host.active_frame();
            host.delete_other_frames(top);
            let bottom = host.split_frame_vertically(top, 100 - self.split_percent);
            host.show_buffer(top, target);
            host.show_buffer(bottom, self.shell_buffer);

            let shell_had_focus = self.shell_frames.first() == Some(&self.active_frame);
            if target_frames.is_empty() || shell_had_focus {
                restore_frame = bottom;
            }
            debug!(%target, %top, %bottom, "split to show target above shell");
        }

        let Some(target_frame) = host.buffer_frames(target).first().copied() else {
            return;
        };
        host.set_active_frame(target_frame);
        host.goto(target, pos);
        host.set_active_frame(restore_frame);
    }
}

/// Show `buffer` in the bottom `split_percent` of the layout if it isn't visible,
/// without changing focus.
pub fn show_maybe_splitting(view: &impl ViewCoordinator, buffer: BufferId, split_percent: u16) {
    if !view.buffer_frames(buffer).is_empty() {
        return;
    }
    let top = view.active_frame();
    view.delete_other_frames(top);
    let bottom = view.split_frame_vertically(top, 100 - split_percent.min(100));
    view.show_buffer(bottom, buffer);
    view.set_active_frame(top);
}

#[derive(Debug)]
pub enum NavigationOutcome {
    /// The file was already open, and navigation is done.
    Pinpointed,
    /// The file is being opened. The task resolves to whether navigation happened.
    Opening(JoinHandle<bool>),
}

/// Navigate to `location`, found in the output of the process bound to
/// `shell_buffer`. If no buffer visits the file yet, it is opened in a task on
/// `local_set` and positioned once the open completes; a failed open drops the
/// navigation.
pub fn navigate_to_location<H>(
    local_set: &LocalSet,
    host: &Rc<H>,
    shell_buffer: BufferId,
    location: &DiagnosticLocation,
    split_percent: u16,
) -> NavigationOutcome
where
    H: EditorHost + 'static,
{
    let request = PinpointRequest::capture(host.as_ref(), shell_buffer, split_percent);
    let pos = location.row_col();

    if let Some(target) = host.find_buffer(&location.filename) {
        let target_frames = host.buffer_frames(target);
        request.pinpoint(host.as_ref(), target, &target_frames, pos);
        debug!(%location, %target, "navigated");
        return NavigationOutcome::Pinpointed;
    }

    let open = host.open_file(&location.filename);
    let host = Rc::clone(host);
    let location = location.clone();
    NavigationOutcome::Opening(local_set.spawn_local(async move {
        match open.await {
            Some(target) => {
                request.pinpoint(host.as_ref(), target, &[], pos);
                debug!(%location, %target, "navigated after open");
                true
            }
            None => {
                debug!(%location, "open failed, navigation dropped");
                false
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{HeadlessEditor, HeadlessFrame};

    fn layout(editor: &HeadlessEditor) -> Vec<(BufferId, u16)> {
        editor
            .frames()
            .iter()
            .map(|HeadlessFrame { buffer, height_percent, .. }| (*buffer, *height_percent))
            .collect()
    }

    #[test]
    fn test_show_maybe_splitting() {
        let editor = HeadlessEditor::new();
        let scratch = editor.active_buffer().unwrap();
        let repl = editor.create_buffer("*scheme*");
        let focused = editor.active_frame();

        show_maybe_splitting(&editor, repl, 33);
        assert_eq!(layout(&editor), vec![(scratch, 67), (repl, 33)]);
        assert_eq!(editor.active_frame(), focused);

        // Already visible: no change.
        show_maybe_splitting(&editor, repl, 33);
        assert_eq!(editor.frames().len(), 2);
    }

    #[test]
    fn test_pinpoint_without_split_keeps_focus() {
        let editor = HeadlessEditor::new();
        let source = editor.create_buffer_with_text("foo.scm", "a\nb\nc\nd\ne\nf\ng\nline 8");
        let repl = editor.create_buffer("*scheme*");
        let top = editor.active_frame();
        editor.switch_to_buffer(source);
        let bottom = editor.split_frame_vertically(top, 67);
        editor.show_buffer(bottom, repl);
        editor.set_active_frame(bottom);

        let outcome = navigate_to_location(
            &LocalSet::new(),
            &Rc::new(editor.clone()),
            repl,
            &DiagnosticLocation::new("foo.scm", 7, 1),
            33,
        );

        assert!(matches!(outcome, NavigationOutcome::Pinpointed));
        assert_eq!(editor.caret(source), RowCol::new(7, 1));
        assert_eq!(editor.active_frame(), bottom);
        assert_eq!(layout(&editor), vec![(source, 67), (repl, 33)]);
    }

    #[test]
    fn test_pinpoint_splits_when_target_hidden() {
        let editor = HeadlessEditor::new();
        let repl = editor.create_buffer("*scheme*");
        let source = editor.create_buffer_with_text("foo.scm", "x\ny");
        editor.switch_to_buffer(repl);
        let shell_frame = editor.active_frame();

        let request = PinpointRequest::capture(&editor, repl, 33);
        request.pinpoint(&editor, source, &[], RowCol::new(1, 0));

        assert_eq!(layout(&editor), vec![(source, 67), (repl, 33)]);
        assert_eq!(editor.caret(source), RowCol::new(1, 0));
        // Focus lands on the shell pane, which is the new bottom frame.
        let bottom = editor.frames()[1].id;
        assert_ne!(bottom, shell_frame);
        assert_eq!(editor.active_frame(), bottom);
        assert_eq!(editor.active_buffer(), Some(repl));
    }

    #[test]
    fn test_pinpoint_splits_when_shell_hidden() {
        let editor = HeadlessEditor::new();
        let repl = editor.create_buffer("*scheme*");
        let source = editor.create_buffer_with_text("foo.scm", "x\ny");
        editor.switch_to_buffer(source);
        let focused = editor.active_frame();

        let request = PinpointRequest::capture(&editor, repl, 33);
        let target_frames = editor.buffer_frames(source);
        request.pinpoint(&editor, source, &target_frames, RowCol::new(0, 1));

        assert_eq!(layout(&editor), vec![(source, 67), (repl, 33)]);
        assert_eq!(editor.active_frame(), focused);
        assert_eq!(editor.caret(source), RowCol::new(0, 1));
    }

    #[tokio::test]
    async fn test_navigate_opens_file_then_pinpoints() {
        let local_set = LocalSet::new();
        let editor = HeadlessEditor::new().with_file("lib.scm", "1\n2\n3");
        let repl = editor.create_buffer("*scheme*");
        editor.switch_to_buffer(repl);
        let host = Rc::new(editor.clone());

        let outcome = navigate_to_location(
            &local_set,
            &host,
            repl,
            &DiagnosticLocation::new("lib.scm", 2, 0),
            33,
        );
        let NavigationOutcome::Opening(task) = outcome else {
            panic!("expected an async open");
        };
        assert!(local_set.run_until(task).await.unwrap());

        let source = editor.find_buffer("lib.scm").unwrap();
        assert_eq!(editor.caret(source), RowCol::new(2, 0));
        assert_eq!(layout(&editor), vec![(source, 67), (repl, 33)]);
    }

    #[tokio::test]
    async fn test_navigate_failed_open_is_dropped() {
        let local_set = LocalSet::new();
        let editor = HeadlessEditor::new();
        let repl = editor.create_buffer("*scheme*");
        let before = editor.frames();

        let outcome = navigate_to_location(
            &local_set,
            &Rc::new(editor.clone()),
            repl,
            &DiagnosticLocation::new("/definitely/missing.scm", 0, 0),
            33,
        );
        let NavigationOutcome::Opening(task) = outcome else {
            panic!("expected an async open");
        };
        assert!(!local_set.run_until(task).await.unwrap());
        assert_eq!(editor.frames(), before);
    }
}
