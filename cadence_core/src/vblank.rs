// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vblank deadline prediction and timer-delay computation.

use crate::time::{Duration, HostTime};

/// Predicts the next vblank deadline from the last present timestamp.
///
/// The display refreshes every `refresh` ticks, so the next scanout lands
/// `refresh − elapsed` after now, where `elapsed` is how long ago the
/// reported present happened. A timestamp more than one refresh in the past
/// predicts `now` — the deadline has effectively already arrived.
#[must_use]
pub fn predict_next_vblank(now: HostTime, presented_at: HostTime, refresh: Duration) -> HostTime {
    let elapsed = now.saturating_duration_since(presented_at);
    let until = refresh.saturating_sub(elapsed);
    now.checked_add(until).unwrap_or(now)
}

/// Computes the one-shot delay that fires `margin` before `deadline`.
///
/// Saturates to zero when the deadline is closer than the margin (or already
/// past), so the timer still fires immediately rather than never.
#[must_use]
pub fn timer_delay(now: HostTime, deadline: HostTime, margin: Duration) -> Duration {
    deadline.saturating_duration_since(now).saturating_sub(margin)
}
