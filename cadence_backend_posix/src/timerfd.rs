// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `timerfd`-backed scheduler timers.
//!
//! [`PosixTimerHost`] implements [`TimerHost`] with one non-blocking
//! `timerfd` per scheduler timer. The compositor's poll loop watches the
//! fds from [`PosixTimerHost::pollables`]; when one becomes readable it
//! calls [`PosixTimerHost::acknowledge`] and routes the returned
//! [`TimerExpiry`] into the scheduler entry point matching its role.
//!
//! The [`TimerHost`] contract is infallible, so syscall failures (fd
//! exhaustion, mostly) are parked in a poison slot the host drains with
//! [`PosixTimerHost::take_error`] after pumping; a failed creation yields
//! the dead sentinel [`PosixTimerHost::DEAD`], which every other operation
//! ignores.

use std::collections::HashMap;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

use cadence_core::monitor::MonitorId;
use cadence_core::time::Duration;
use cadence_core::timer::{TimerHost, TimerId, TimerRole};
use rustix::io::Errno;
use rustix::time::{
    Itimerspec, TimerfdClockId, TimerfdFlags, TimerfdTimerFlags, Timespec, timerfd_create,
    timerfd_settime,
};

/// One delivered timer expiration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerExpiry {
    /// Which timer fired.
    pub timer: TimerId,
    /// The monitor the timer was created for.
    pub monitor: MonitorId,
    /// Which scheduler entry point to route to.
    pub role: TimerRole,
    /// Expiration count reported by the kernel (≥ 1).
    pub expirations: u64,
}

#[derive(Debug)]
struct TimerFdEntry {
    fd: OwnedFd,
    monitor: MonitorId,
    role: TimerRole,
}

/// A [`TimerHost`] over per-timer `timerfd`s.
#[derive(Debug, Default)]
pub struct PosixTimerHost {
    timers: HashMap<TimerId, TimerFdEntry>,
    next_id: u64,
    error: Option<Errno>,
}

impl PosixTimerHost {
    /// The id returned when timer creation fails. Arming, cancelling, or
    /// destroying it is a no-op.
    pub const DEAD: TimerId = TimerId(0);

    /// Creates an empty timer host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fallible counterpart of [`TimerHost::create`].
    pub fn try_create(&mut self, monitor: MonitorId, role: TimerRole) -> rustix::io::Result<TimerId> {
        let fd = timerfd_create(
            TimerfdClockId::Monotonic,
            TimerfdFlags::NONBLOCK | TimerfdFlags::CLOEXEC,
        )?;
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(id, TimerFdEntry { fd, monitor, role });
        Ok(id)
    }

    /// Fallible counterpart of [`TimerHost::arm`]. Unknown ids are a no-op.
    pub fn try_arm(&mut self, timer: TimerId, delay: Duration) -> rustix::io::Result<()> {
        let Some(entry) = self.timers.get(&timer) else {
            return Ok(());
        };
        // A zero it_value disarms a timerfd; clamp so an already-due
        // deadline still fires.
        let nanos = delay.ticks().max(1);
        settime(&entry.fd, nanos)
    }

    /// Fallible counterpart of [`TimerHost::cancel`]. Unknown ids are a
    /// no-op.
    pub fn try_cancel(&mut self, timer: TimerId) -> rustix::io::Result<()> {
        let Some(entry) = self.timers.get(&timer) else {
            return Ok(());
        };
        settime(&entry.fd, 0)
    }

    /// Consumes a pending expiration on `timer`, if any.
    ///
    /// Returns `None` when the timer has not expired (or does not exist);
    /// the read also clears the fd's readability.
    pub fn acknowledge(&mut self, timer: TimerId) -> Option<TimerExpiry> {
        let entry = self.timers.get(&timer)?;
        let mut buf = [0_u8; 8];
        match rustix::io::read(&entry.fd, &mut buf[..]) {
            Ok(8) => Some(TimerExpiry {
                timer,
                monitor: entry.monitor,
                role: entry.role,
                expirations: u64::from_ne_bytes(buf),
            }),
            _ => None,
        }
    }

    /// Returns the fds to watch for readability, with their timer ids.
    pub fn pollables(&self) -> impl Iterator<Item = (TimerId, BorrowedFd<'_>)> {
        self.timers.iter().map(|(id, entry)| (*id, entry.fd.as_fd()))
    }

    /// Takes the most recent syscall failure recorded by the infallible
    /// [`TimerHost`] methods, if any.
    pub fn take_error(&mut self) -> Option<Errno> {
        self.error.take()
    }

    /// Number of live timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns `true` when no timers exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl TimerHost for PosixTimerHost {
    fn create(&mut self, monitor: MonitorId, role: TimerRole) -> TimerId {
        match self.try_create(monitor, role) {
            Ok(id) => id,
            Err(errno) => {
                self.error = Some(errno);
                Self::DEAD
            }
        }
    }

    fn arm(&mut self, timer: TimerId, delay: Duration) {
        if let Err(errno) = self.try_arm(timer, delay) {
            self.error = Some(errno);
        }
    }

    fn cancel(&mut self, timer: TimerId) {
        if let Err(errno) = self.try_cancel(timer) {
            self.error = Some(errno);
        }
    }

    fn destroy(&mut self, timer: TimerId) {
        // Dropping the entry closes the fd, which also disarms it.
        let _ = self.timers.remove(&timer);
    }
}

fn settime(fd: &OwnedFd, value_nanos: u64) -> rustix::io::Result<()> {
    let spec = Itimerspec {
        it_interval: Timespec {
            tv_sec: 0,
            tv_nsec: 0,
        },
        it_value: nanos_to_timespec(value_nanos),
    };
    timerfd_settime(fd, TimerfdTimerFlags::empty(), &spec)?;
    Ok(())
}

fn nanos_to_timespec(nanos: u64) -> Timespec {
    let tv_sec = i64::try_from(nanos / 1_000_000_000).unwrap_or(i64::MAX);
    let tv_nsec = i64::try_from(nanos % 1_000_000_000).unwrap_or(0);
    Timespec { tv_sec, tv_nsec }
}
