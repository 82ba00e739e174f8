// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

use super::{IdleOutcome, tick_delay};
use crate::ProcessHandle;

/// What the tick loop drives. The session implements this on top of its registry;
/// keeping it a trait lets the loop be tested on its own.
pub trait TickTarget {
    /// Heartbeat, then run until the runtime would wait. `None` means the process is
    /// gone (killed, or its session dropped), and the loop stops without cleanup.
    fn run_slice(&self, handle: ProcessHandle) -> Option<IdleOutcome>;

    /// Flush the output produced during this tick.
    fn end_of_tick(&self, handle: ProcessHandle);

    /// The runtime finished: clean it up and mark the process terminated.
    fn finish(&self, handle: ProcessHandle);
}

/// Per process scheduling state. Lives as long as the tick loop does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleState {
    /// Number of ticks that ran a slice.
    pub ticks: u64,
    /// When the next tick is due, if one is scheduled.
    pub next_wake: Option<Instant>,
}

/// Runs ticks until the runtime finishes or the process goes away. Exactly one tick is
/// in flight at a time, since the next one only starts after this one's sleep.
pub async fn run_tick_loop(target: impl TickTarget, handle: ProcessHandle) -> ScheduleState {
    let mut schedule = ScheduleState::default();
    debug!(%handle, "tick loop started");

    loop {
        schedule.next_wake = None;
        let Some(outcome) = target.run_slice(handle) else {
            debug!(%handle, ticks = schedule.ticks, "process gone, tick loop stopped");
            break;
        };
        schedule.ticks += 1;
        target.end_of_tick(handle);

        match outcome {
            IdleOutcome::Finished => {
                target.finish(handle);
                debug!(%handle, ticks = schedule.ticks, "runtime finished");
                break;
            }
            IdleOutcome::Wait(wait) => {
                let delay = tick_delay(wait);
                schedule.next_wake = Instant::now().checked_add(delay);
                trace!(%handle, tick = schedule.ticks, ?delay, "next tick scheduled");
                sleep(delay).await;
            }
        }
    }

    schedule
}
