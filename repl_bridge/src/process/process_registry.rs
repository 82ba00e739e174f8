// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::collections::HashMap;

use tracing::trace;

use crate::{BufferId, IdleOutcome, InputPayload, InterpreterRuntime, ProcessHandle,
            ProcessRecord, ProcessState, SubscriptionId};

/// Owns every [`ProcessRecord`] of one session. A [`ProcessHandle`] resolves to at most
/// one record, and every operation on a handle that isn't registered does nothing.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    next_handle: u32,
    records: HashMap<ProcessHandle, ProcessRecord>,
}

impl ProcessRegistry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Allocates a handle that isn't in use, and registers a [`ProcessState::Created`]
    /// record for it.
    pub fn register(
        &mut self,
        kind: &str,
        runtime: Box<dyn InterpreterRuntime>,
    ) -> ProcessHandle {
        let handle = self.allocate_handle();
        self.records
            .insert(handle, ProcessRecord::new(handle, kind, runtime));
        handle
    }

    fn allocate_handle(&mut self) -> ProcessHandle {
        loop {
            let candidate = ProcessHandle(self.next_handle);
            self.next_handle = self.next_handle.wrapping_add(1);
            if !self.records.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    #[must_use]
    pub fn get(&self, handle: ProcessHandle) -> Option<&ProcessRecord> {
        self.records.get(&handle)
    }

    pub fn get_mut(&mut self, handle: ProcessHandle) -> Option<&mut ProcessRecord> {
        self.records.get_mut(&handle)
    }

    /// Removing an unknown handle returns `None`, so this is idempotent.
    pub fn remove(&mut self, handle: ProcessHandle) -> Option<ProcessRecord> {
        self.records.remove(&handle)
    }

    #[must_use]
    pub fn contains(&self, handle: ProcessHandle) -> bool {
        self.records.contains_key(&handle)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.records.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    #[must_use]
    pub fn state(&self, handle: ProcessHandle) -> Option<ProcessState> {
        self.get(handle).map(|it| it.state)
    }

    #[must_use]
    pub fn consumer_buffer(&self, handle: ProcessHandle) -> Option<BufferId> {
        self.get(handle)?.consumer_buffer
    }

    #[must_use]
    pub fn find_by_buffer(&self, buffer: BufferId) -> Option<ProcessHandle> {
        self.records
            .values()
            .find(|it| it.consumer_buffer == Some(buffer))
            .map(|it| it.handle)
    }

    /// Unbinds `buffer` from every record other than `keep`. Returns the records that
    /// were unbound, with their delete subscriptions for the caller to cancel.
    pub fn detach_buffer(
        &mut self,
        buffer: BufferId,
        keep: ProcessHandle,
    ) -> Vec<(ProcessHandle, Option<SubscriptionId>)> {
        self.records
            .values_mut()
            .filter(|it| it.handle != keep && it.consumer_buffer == Some(buffer))
            .map(|it| {
                it.consumer_buffer = None;
                (it.handle, it.delete_subscription.take())
            })
            .collect()
    }

    /// Returns whether the handle was known.
    pub fn push_input(&mut self, handle: ProcessHandle, payload: InputPayload) -> bool {
        match self.get_mut(handle) {
            Some(record) => {
                record.channel.push_input(payload);
                true
            }
            None => {
                trace!(%handle, "push_input on unknown handle ignored");
                false
            }
        }
    }

    /// Returns whether the handle was known.
    pub fn request_interrupt(&mut self, handle: ProcessHandle) -> bool {
        match self.get_mut(handle) {
            Some(record) => {
                record.interrupt_requested = true;
                true
            }
            None => {
                trace!(%handle, "interrupt on unknown handle ignored");
                false
            }
        }
    }

    /// One scheduler slice for a [`ProcessState::Running`] process: heartbeat, then run
    /// until the runtime would next wait. `None` if there is nothing to run. Output left
    /// incomplete by a runtime that finished is flushed.
    pub fn run_slice(&mut self, handle: ProcessHandle) -> Option<IdleOutcome> {
        let record = self.get_mut(handle)?;
        if record.state != ProcessState::Running {
            return None;
        }
        let outcome = record.with_runtime(|runtime, io| {
            runtime.heartbeat(io);
            runtime.idle(io)
        })?;
        if outcome == IdleOutcome::Finished {
            record.channel.finish_output();
        }
        Some(outcome)
    }

    /// The record stays registered (and bound) as [`ProcessState::Terminated`] until it
    /// is killed. Returns the runtime, for the caller to clean up.
    pub fn mark_terminated(
        &mut self,
        handle: ProcessHandle,
    ) -> Option<Box<dyn InterpreterRuntime>> {
        let record = self.get_mut(handle)?;
        record.state = ProcessState::Terminated;
        record.take_runtime()
    }

    /// Decoded output that hasn't been delivered yet, paired with the buffer it goes to.
    pub fn take_output(&mut self, handle: ProcessHandle) -> Option<(BufferId, String)> {
        let record = self.get_mut(handle)?;
        let text = record.channel.take_output()?;
        Some((record.consumer_buffer?, text))
    }
}
