// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer host double with absolute-deadline bookkeeping.

use alloc::vec::Vec;

use cadence_core::monitor::MonitorId;
use cadence_core::time::{Duration, HostTime};
use cadence_core::timer::{TimerHost, TimerId, TimerRole};

/// One timer that came due during [`FakeTimerHost::advance_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer {
    /// Which timer.
    pub timer: TimerId,
    /// The monitor it was created for.
    pub monitor: MonitorId,
    /// Which scheduler entry point it routes to.
    pub role: TimerRole,
}

#[derive(Debug)]
struct Entry {
    id: TimerId,
    monitor: MonitorId,
    role: TimerRole,
    deadline: Option<HostTime>,
}

/// A [`TimerHost`] that records deadlines against a simulated clock.
///
/// Arming computes `now + delay (+ jitter)`; [`Self::advance_to`] drains the
/// timers whose deadlines have passed, disarming them, so tests control
/// firing order exactly.
#[derive(Debug, Default)]
pub struct FakeTimerHost {
    now: HostTime,
    next_id: u64,
    jitter: Duration,
    timers: Vec<Entry>,
}

impl FakeTimerHost {
    /// Creates a timer host with no deadline skew.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a timer host that arms every deadline `jitter` late.
    #[must_use]
    pub fn with_jitter(jitter: Duration) -> Self {
        Self {
            jitter,
            ..Self::default()
        }
    }

    /// Returns the configured deadline skew.
    #[must_use]
    pub const fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Returns the host's current view of time.
    #[must_use]
    pub const fn now(&self) -> HostTime {
        self.now
    }

    /// Moves time to `now` and returns the timers that came due, soonest
    /// deadline first. Fired timers are disarmed (they are one-shot).
    pub fn advance_to(&mut self, now: HostTime) -> Vec<FiredTimer> {
        self.now = now;

        let mut due: Vec<(HostTime, FiredTimer)> = Vec::new();
        for entry in &mut self.timers {
            if let Some(deadline) = entry.deadline
                && deadline <= now
            {
                entry.deadline = None;
                due.push((
                    deadline,
                    FiredTimer {
                        timer: entry.id,
                        monitor: entry.monitor,
                        role: entry.role,
                    },
                ));
            }
        }
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, fired)| fired).collect()
    }

    /// Number of live (created, not destroyed) timers.
    #[must_use]
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Number of currently armed timers.
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.timers.iter().filter(|t| t.deadline.is_some()).count()
    }

    /// The armed deadline for `monitor`'s timer with the given role, if any.
    #[must_use]
    pub fn deadline_for(&self, monitor: MonitorId, role: TimerRole) -> Option<HostTime> {
        self.timers
            .iter()
            .find(|t| t.monitor == monitor && t.role == role)
            .and_then(|t| t.deadline)
    }
}

impl TimerHost for FakeTimerHost {
    fn create(&mut self, monitor: MonitorId, role: TimerRole) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Entry {
            id,
            monitor,
            role,
            deadline: None,
        });
        id
    }

    fn arm(&mut self, timer: TimerId, delay: Duration) {
        let deadline = self
            .now
            .checked_add(delay.saturating_add(self.jitter))
            .unwrap_or(self.now);
        if let Some(entry) = self.timers.iter_mut().find(|t| t.id == timer) {
            entry.deadline = Some(deadline);
        }
    }

    fn cancel(&mut self, timer: TimerId) {
        if let Some(entry) = self.timers.iter_mut().find(|t| t.id == timer) {
            entry.deadline = None;
        }
    }

    fn destroy(&mut self, timer: TimerId) {
        self.timers.retain(|t| t.id != timer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armed_timer_fires_at_deadline_and_disarms() {
        let mut host = FakeTimerHost::new();
        let id = host.create(MonitorId(1), TimerRole::Vblank);
        host.arm(id, Duration::from_millis(5));

        assert!(host.advance_to(HostTime(4_000_000)).is_empty());
        let fired = host.advance_to(HostTime(5_000_000));
        assert_eq!(
            fired,
            [FiredTimer {
                timer: id,
                monitor: MonitorId(1),
                role: TimerRole::Vblank,
            }]
        );
        assert!(host.advance_to(HostTime(10_000_000)).is_empty(), "one-shot");
    }

    #[test]
    fn fires_sort_by_deadline() {
        let mut host = FakeTimerHost::new();
        let late = host.create(MonitorId(1), TimerRole::Vblank);
        let early = host.create(MonitorId(2), TimerRole::FencePoll);
        host.arm(late, Duration::from_millis(8));
        host.arm(early, Duration::from_millis(3));

        let fired = host.advance_to(HostTime(10_000_000));
        assert_eq!(fired[0].timer, early);
        assert_eq!(fired[1].timer, late);
    }

    #[test]
    fn cancel_and_destroy_disarm() {
        let mut host = FakeTimerHost::new();
        let a = host.create(MonitorId(1), TimerRole::Vblank);
        let b = host.create(MonitorId(1), TimerRole::FencePoll);
        host.arm(a, Duration::from_millis(1));
        host.arm(b, Duration::from_millis(1));

        host.cancel(a);
        host.destroy(b);
        assert!(host.advance_to(HostTime(5_000_000)).is_empty());
        assert_eq!(host.timer_count(), 1);
        assert_eq!(host.armed_count(), 0);
    }

    #[test]
    fn rearm_replaces_deadline() {
        let mut host = FakeTimerHost::new();
        let id = host.create(MonitorId(1), TimerRole::Vblank);
        host.arm(id, Duration::from_millis(2));
        host.arm(id, Duration::from_millis(9));
        assert!(host.advance_to(HostTime(5_000_000)).is_empty());
        assert_eq!(host.advance_to(HostTime(9_000_000)).len(), 1);
    }

    #[test]
    fn jitter_delays_deadlines() {
        let mut host = FakeTimerHost::with_jitter(Duration::from_millis(1));
        let id = host.create(MonitorId(1), TimerRole::Vblank);
        host.arm(id, Duration::from_millis(5));
        assert_eq!(
            host.deadline_for(MonitorId(1), TimerRole::Vblank),
            Some(HostTime(6_000_000))
        );
    }
}
