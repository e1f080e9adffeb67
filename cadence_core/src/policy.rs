// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability-graded pacing policy.
//!
//! Backends differ in how much they can tell us about presentation. This
//! module captures that spectrum as a policy selected **once** per output at
//! registration time:
//!
//! - [`BackendCaps`] — what the backend reports for an output
//! - [`PacingMode`] — the scheduling policy derived from those capabilities
//! - [`PacingConfig`] — tunable intervals for the scheduler
//!
//! A hardware KMS-class output with present timestamps and GPU fences gets
//! [`PacingMode::Fenced`]: the scheduler predicts vblank deadlines and races
//! the GPU against them. Anything less (nested or windowed backends, or
//! outputs where fencing is structurally unavailable) gets
//! [`PacingMode::Legacy`]: the backend's own frame ticks pace rendering and
//! the scheduler stays out of the way.

use crate::time::Duration;

/// Presentation capabilities a backend reports for one output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BackendCaps {
    /// Present-completion notifications carry reliable hardware timestamps.
    pub precise_present: bool,
    /// Renders can return a GPU completion fence.
    pub gpu_fences: bool,
}

impl BackendCaps {
    /// Capabilities of a direct hardware output (KMS-class).
    #[must_use]
    pub const fn full() -> Self {
        Self {
            precise_present: true,
            gpu_fences: true,
        }
    }

    /// Capabilities of a nested or windowed output: an unstructured frame
    /// tick and nothing else.
    #[must_use]
    pub const fn tick_only() -> Self {
        Self {
            precise_present: false,
            gpu_fences: false,
        }
    }
}

/// The pacing policy for one output, fixed at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PacingMode {
    /// Deadline-driven pacing: predict the next vblank from present
    /// timestamps and track GPU completion through fences.
    Fenced,
    /// Tick-driven pacing: render on every backend frame tick, no
    /// prediction. Used when present timestamps or fences are unreliable.
    Legacy,
}

impl PacingMode {
    /// Selects the pacing policy for the given capabilities.
    ///
    /// Fenced pacing needs both reliable present timestamps (to predict the
    /// deadline) and fences (to know whether the GPU beat it); missing
    /// either one degrades to [`Self::Legacy`].
    #[must_use]
    pub const fn from_caps(caps: BackendCaps) -> Self {
        if caps.precise_present && caps.gpu_fences {
            Self::Fenced
        } else {
            Self::Legacy
        }
    }

    /// Returns `true` for [`Self::Legacy`].
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

/// Tunable intervals for the presentation scheduler.
#[derive(Clone, Copy, Debug)]
pub struct PacingConfig {
    /// How far before the predicted vblank deadline the vblank timer fires.
    pub vblank_safety_margin: Duration,
    /// Retry cadence for polling an unsignaled fence after a missed vblank.
    pub fence_poll_interval: Duration,
    /// Window after an accepted present during which an external frame
    /// request is deferred to the next present instead of rendered
    /// immediately.
    pub defer_window: Duration,
    /// Full frames forced at registration so every buffer in the swapchain
    /// is drawn at least once.
    pub startup_force_frames: u32,
}

impl PacingConfig {
    /// The default pacing configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vblank_safety_margin: Duration::from_micros(500),
            fence_poll_interval: Duration::from_micros(300),
            defer_window: Duration::from_millis(100),
            startup_force_frames: 5,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self::new()
    }
}
