// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{cell::RefCell,
          rc::{Rc, Weak}};

use tokio::task::{JoinHandle, LocalSet};
use tracing::{debug, error, trace};

use crate::{BridgeConfig, BufferId, DiagnosticLocation, EditorHost, IdleOutcome,
            InputPayload, NavigationOutcome, ProcessHandle, ProcessRegistry, ProcessState,
            RuntimeFactory, ScheduleState, TickTarget, find_latest_location,
            navigate_to_location, run_tick_loop};

/// One editor's view of its interpreter processes. Clones share the same state.
///
/// No operation returns an error. Operations on a handle (or buffer) that has no
/// process do nothing.
///
/// Tick loops and pending file opens are spawned onto the session's own [`LocalSet`],
/// so spawning works from anywhere on the session's thread. They make progress while
/// that set is driven, see [`ReplSession::local_set`].
pub struct ReplSession<H: EditorHost + 'static> {
    pub(super) inner: Rc<SessionInner<H>>,
}

pub(super) struct SessionInner<H: EditorHost + 'static> {
    pub(super) host: Rc<H>,
    pub(super) registry: RefCell<ProcessRegistry>,
    pub(super) factory: Box<dyn RuntimeFactory>,
    pub(super) config: BridgeConfig,
    pub(super) local_set: Rc<LocalSet>,
}

impl<H: EditorHost + 'static> Clone for ReplSession<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: EditorHost + 'static> std::fmt::Debug for ReplSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplSession")
            .field("registry", &self.inner.registry)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<H: EditorHost + 'static> ReplSession<H> {
    pub fn new(
        host: Rc<H>,
        factory: impl RuntimeFactory + 'static,
        config: BridgeConfig,
    ) -> Self {
        Self {
            inner: Rc::new(SessionInner {
                host,
                registry: RefCell::new(ProcessRegistry::new()),
                factory: Box::new(factory),
                config,
                local_set: Rc::new(LocalSet::new()),
            }),
        }
    }

    #[must_use]
    pub fn host(&self) -> &Rc<H> { &self.inner.host }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig { &self.inner.config }

    /// The set the session's tasks run on. Drive it with [`LocalSet::run_until`] or
    /// [`LocalSet::block_on`] for processes to tick.
    #[must_use]
    pub fn local_set(&self) -> Rc<LocalSet> { Rc::clone(&self.inner.local_set) }

    fn downgrade(&self) -> Weak<SessionInner<H>> { Rc::downgrade(&self.inner) }

    /// Allocate a process of `kind`. `None` if the kind isn't supported, in which case
    /// nothing is registered.
    pub fn make(&self, kind: &str) -> Option<ProcessHandle> {
        let Some(runtime) = self.inner.factory.create(kind) else {
            debug!(kind, "make: unsupported process kind");
            return None;
        };
        let handle = self.inner.registry.borrow_mut().register(kind, runtime);
        debug!(%handle, kind, "make");
        Some(handle)
    }

    /// Bind `buffer` as the consumer of the process's output. Deleting the buffer kills
    /// the process. Rebinding replaces the previous buffer. A buffer has at most one
    /// process, so any other process bound to `buffer` is detached from it.
    pub fn bind(&self, handle: ProcessHandle, buffer: BufferId) {
        if !self.inner.registry.borrow().contains(handle) {
            trace!(%handle, "bind on unknown handle ignored");
            return;
        }

        let detached = self.inner.registry.borrow_mut().detach_buffer(buffer, handle);
        for (other, subscription) in detached {
            if let Some(subscription) = subscription {
                self.inner.host.unsubscribe(subscription);
            }
            debug!(%other, %buffer, "detached from buffer");
        }

        let weak = self.downgrade();
        let subscription = self.inner.host.subscribe_on_delete(
            buffer,
            Box::new(move |_| {
                if let Some(inner) = weak.upgrade() {
                    ReplSession { inner }.kill(handle);
                }
            }),
        );

        let previous = self
            .inner
            .registry
            .borrow_mut()
            .get_mut(handle)
            .and_then(|record| {
                record.consumer_buffer = Some(buffer);
                record.delete_subscription.replace(subscription)
            });
        if let Some(previous) = previous {
            self.inner.host.unsubscribe(previous);
        }
        debug!(%handle, %buffer, "bind");
    }

    /// `Created` to `Running`: call the runtime's entry point, then hand it to the
    /// scheduler. If the entry point fails, the process is terminated instead.
    pub fn start(&self, handle: ProcessHandle) {
        let entry_result = {
            let mut registry = self.inner.registry.borrow_mut();
            let Some(record) = registry.get_mut(handle) else {
                trace!(%handle, "start on unknown handle ignored");
                return;
            };
            if record.state != ProcessState::Created {
                trace!(%handle, state = %record.state, "start ignored");
                return;
            }
            record.state = ProcessState::Running;
            record.with_runtime(|runtime, _| runtime.entry())
        };

        if let Some(Err(report)) = entry_result {
            error!(%handle, ?report, "runtime entry failed");
            self.finish(handle);
            return;
        }

        let target = SessionTickTarget {
            inner: self.downgrade(),
        };
        let task = self.inner.local_set.spawn_local(run_tick_loop(target, handle));
        if let Some(record) = self.inner.registry.borrow_mut().get_mut(handle) {
            record.tick_task = Some(task);
        }
        debug!(%handle, "start");
    }

    /// Any state to `Terminated`, and the record is removed. The bound buffer is only
    /// detached, its content is left alone. Killing twice is fine.
    pub fn kill(&self, handle: ProcessHandle) {
        let Some(mut record) = self.inner.registry.borrow_mut().remove(handle) else {
            trace!(%handle, "kill on unknown handle ignored");
            return;
        };

        if let Some(subscription) = record.delete_subscription.take() {
            self.inner.host.unsubscribe(subscription);
        }
        if let Some(mut runtime) = record.take_runtime() {
            runtime.cleanup();
        }
        debug!(%handle, buffer = ?record.consumer_buffer, "kill");
    }

    /// Observed by the runtime at its next heartbeat.
    pub fn interrupt(&self, handle: ProcessHandle) {
        if self.inner.registry.borrow_mut().request_interrupt(handle) {
            debug!(%handle, "interrupt requested");
        }
    }

    pub fn push_input(&self, handle: ProcessHandle, payload: InputPayload) {
        self.inner.registry.borrow_mut().push_input(handle, payload);
    }

    #[must_use]
    pub fn state(&self, handle: ProcessHandle) -> Option<ProcessState> {
        self.inner.registry.borrow().state(handle)
    }

    #[must_use]
    pub fn is_registered(&self, handle: ProcessHandle) -> bool {
        self.inner.registry.borrow().contains(handle)
    }

    /// The process whose output goes to `buffer`.
    #[must_use]
    pub fn buffer_process(&self, buffer: BufferId) -> Option<ProcessHandle> {
        self.inner.registry.borrow().find_by_buffer(buffer)
    }

    /// The scheduler task of a started process, to wait for it to terminate. It can be
    /// taken once.
    pub fn take_tick_task(&self, handle: ProcessHandle) -> Option<JoinHandle<ScheduleState>> {
        self.inner.registry.borrow_mut().get_mut(handle)?.tick_task.take()
    }

    /// End of tick flush: append the text decoded this tick to the bound buffer, and
    /// navigate to the most recent location it completes.
    pub fn deliver_output(&self, handle: ProcessHandle) {
        let Some((buffer, text)) = self.inner.registry.borrow_mut().take_output(handle)
        else {
            return;
        };

        let previous_last_row = self.inner.host.last_row(buffer);
        self.inner.host.append_text(buffer, &text);
        trace!(%handle, %buffer, len = text.len(), "output delivered");

        if let Some(location) = find_latest_location(&previous_last_row, &text) {
            self.navigate_to(buffer, &location);
        }
    }

    /// See [`navigate_to_location`].
    pub fn navigate_to(
        &self,
        shell_buffer: BufferId,
        location: &DiagnosticLocation,
    ) -> NavigationOutcome {
        debug!(%location, "navigate_to");
        navigate_to_location(
            &self.inner.local_set,
            &self.inner.host,
            shell_buffer,
            location,
            self.inner.config.split_percent,
        )
    }

    fn run_slice(&self, handle: ProcessHandle) -> Option<IdleOutcome> {
        self.inner.registry.borrow_mut().run_slice(handle)
    }

    /// The record stays registered as `Terminated`, still bound to its buffer, until it
    /// is killed.
    fn finish(&self, handle: ProcessHandle) {
        let runtime = self.inner.registry.borrow_mut().mark_terminated(handle);
        if let Some(mut runtime) = runtime {
            runtime.cleanup();
        }
        debug!(%handle, "terminated");
    }
}

/// Holds the session weakly, so a dropped session stops its tick loops.
struct SessionTickTarget<H: EditorHost + 'static> {
    inner: Weak<SessionInner<H>>,
}

impl<H: EditorHost + 'static> SessionTickTarget<H> {
    fn session(&self) -> Option<ReplSession<H>> {
        self.inner.upgrade().map(|inner| ReplSession { inner })
    }
}

impl<H: EditorHost + 'static> TickTarget for SessionTickTarget<H> {
    fn run_slice(&self, handle: ProcessHandle) -> Option<IdleOutcome> {
        self.session()?.run_slice(handle)
    }

    fn end_of_tick(&self, handle: ProcessHandle) {
        if let Some(session) = self.session() {
            session.deliver_output(handle);
        }
    }

    fn finish(&self, handle: ProcessHandle) {
        if let Some(session) = self.session() {
            session.finish(handle);
        }
    }
}
