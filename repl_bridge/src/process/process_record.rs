// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tokio::task::JoinHandle;

use crate::{BufferId, InterpreterRuntime, IoChannel, ProcessHandle, ProcessState,
            RuntimeIo, ScheduleState, SubscriptionId};

/// Everything the registry knows about one process.
pub struct ProcessRecord {
    pub handle: ProcessHandle,
    pub kind: String,
    /// The buffer that receives this process's output. At most one.
    pub consumer_buffer: Option<BufferId>,
    pub state: ProcessState,
    pub channel: IoChannel,
    /// Set by `interrupt`, cleared when the runtime observes it in its heartbeat.
    pub interrupt_requested: bool,
    pub delete_subscription: Option<SubscriptionId>,
    /// `None` once the runtime has been taken out to be cleaned up.
    pub runtime: Option<Box<dyn InterpreterRuntime>>,
    /// The scheduler task, until someone takes it to wait for termination.
    pub tick_task: Option<JoinHandle<ScheduleState>>,
}

impl std::fmt::Debug for ProcessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRecord")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("consumer_buffer", &self.consumer_buffer)
            .field("state", &self.state)
            .field("interrupt_requested", &self.interrupt_requested)
            .field("has_runtime", &self.runtime.is_some())
            .field("has_tick_task", &self.tick_task.is_some())
            .finish_non_exhaustive()
    }
}

impl ProcessRecord {
    #[must_use]
    pub fn new(
        handle: ProcessHandle,
        kind: &str,
        runtime: Box<dyn InterpreterRuntime>,
    ) -> Self {
        Self {
            handle,
            kind: kind.to_string(),
            consumer_buffer: None,
            state: ProcessState::Created,
            channel: IoChannel::new(),
            interrupt_requested: false,
            delete_subscription: None,
            runtime: Some(runtime),
            tick_task: None,
        }
    }

    /// Split borrow: the runtime and the [`RuntimeIo`] it works through both live in
    /// this record. Returns `None` if there is no runtime.
    pub fn with_runtime<R>(
        &mut self,
        f: impl FnOnce(&mut dyn InterpreterRuntime, &mut RuntimeIo<'_>) -> R,
    ) -> Option<R> {
        let Self {
            runtime,
            channel,
            interrupt_requested,
            ..
        } = self;
        let runtime = runtime.as_deref_mut()?;
        let mut io = RuntimeIo::new(channel, interrupt_requested);
        Some(f(runtime, &mut io))
    }

    pub fn take_runtime(&mut self) -> Option<Box<dyn InterpreterRuntime>> {
        self.runtime.take()
    }
}
