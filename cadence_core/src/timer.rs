// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event-loop timer contract.
//!
//! The scheduler owns two timers per registered monitor — one predicting the
//! vblank deadline, one polling a stuck fence — but never runs an event loop
//! itself. The host implements [`TimerHost`] over its loop's timer
//! primitive, and when a timer expires it routes the fire back into the
//! scheduler entry point matching the timer's [`TimerRole`].
//!
//! Ownership contract: a timer created for a scheduling record belongs to
//! that record. The scheduler destroys both timers before it erases the
//! record, so a host that honors [`TimerHost::destroy`] can never deliver a
//! fire into freed state.

use core::fmt;

use crate::monitor::MonitorId;
use crate::time::Duration;

/// Identifies one host timer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

/// Which scheduler entry point a timer fire should be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerRole {
    /// Fires shortly before the predicted vblank deadline; route to
    /// `PresentScheduler::on_vblank_timer`.
    Vblank,
    /// Polls an unsignaled fence after a missed vblank; route to
    /// `PresentScheduler::on_fence_timer`.
    FencePoll,
}

/// Host-provided one-shot timers with microsecond-or-better resolution.
///
/// All methods are infallible from the scheduler's point of view; hosts
/// surface platform errors through their own channels (see the POSIX
/// backend's poisoning accessor).
pub trait TimerHost {
    /// Creates a disarmed timer bound to `monitor` with the given routing
    /// role.
    fn create(&mut self, monitor: MonitorId, role: TimerRole) -> TimerId;

    /// Arms the timer to fire once after `delay`. Arming an already-armed
    /// timer replaces the pending deadline.
    fn arm(&mut self, timer: TimerId, delay: Duration);

    /// Disarms the timer without destroying it. A no-op if the timer is not
    /// armed.
    fn cancel(&mut self, timer: TimerId);

    /// Disarms and releases the timer. After this returns the host must not
    /// deliver any further fires for it.
    fn destroy(&mut self, timer: TimerId);
}
