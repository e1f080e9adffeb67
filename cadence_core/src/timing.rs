// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timing signals delivered to the scheduler.
//!
//! [`PresentEvent`] carries what a backend knows about a completed present.
//! Capable backends fill the timestamp and (when the display reports one)
//! the refresh-interval hint; the scheduler's own synthetic "present now"
//! path carries neither, which is also what suppresses vblank-timer arming
//! for that cycle.

use crate::time::{Duration, HostTime};

/// A present-completion notification, or a synthetic immediate present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentEvent {
    /// Host time when the event is being processed.
    pub now: HostTime,
    /// Hardware timestamp of the completed present, if the backend reports
    /// one. `None` marks a synthetic present: render immediately, predict
    /// nothing.
    pub presented_at: Option<HostTime>,
    /// Refresh interval reported alongside the present, if any. When absent
    /// the monitor's nominal refresh interval is used for prediction.
    pub refresh: Option<Duration>,
}

impl PresentEvent {
    /// Creates a synthetic "present now" event with no timestamp.
    #[must_use]
    pub const fn synthetic(now: HostTime) -> Self {
        Self {
            now,
            presented_at: None,
            refresh: None,
        }
    }

    /// Creates a backend present-completion event.
    #[must_use]
    pub const fn presented(now: HostTime, presented_at: HostTime, refresh: Option<Duration>) -> Self {
        Self {
            now,
            presented_at: Some(presented_at),
            refresh,
        }
    }
}
