// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic fakes and pacing metrics for scheduler tests.
//!
//! Everything here is driven by explicit time: tests construct a [`Sim`],
//! advance it, and dispatch the timers it reports due. No threads, no real
//! clocks, no nondeterminism.
//!
//! - [`FakeClock`] — manually advanced monotonic clock
//! - [`FakeTimerHost`] — absolute-deadline timer bookkeeping with a
//!   [`due`](FakeTimerHost::advance_to) drain
//! - [`FakeGpu`] — renderer double that mints fences and signals them after
//!   a configurable latency (or never, under [`PathologyToggles::gpu_stall`])
//! - [`ScriptedSession`] — settable session flags
//! - [`PacingTracker`] — rolling frame-delta metrics with grading

#![no_std]

extern crate alloc;

mod clock;
mod gpu;
mod session;
mod stats;
mod timers;

#[cfg(test)]
mod scenarios;

pub use clock::FakeClock;
pub use gpu::{FakeGpu, RenderCall};
pub use session::ScriptedSession;
pub use stats::{PacingGrade, PacingReport, PacingSample, PacingTracker};
pub use timers::{FakeTimerHost, FiredTimer};

use cadence_core::host::HostCtx;
use cadence_core::time::Duration;
use cadence_core::trace::Tracer;

/// Runtime pathology toggles for stress tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathologyToggles {
    /// Fences never signal on their own.
    pub gpu_stall: bool,
    /// Timer fires land a fixed skew late.
    pub timer_jitter: bool,
    /// Scenario drivers should alternate refresh-interval hints.
    pub vary_refresh: bool,
}

/// A bundle of fakes sharing one simulated clock.
#[derive(Debug)]
pub struct Sim {
    /// The simulated monotonic clock.
    pub clock: FakeClock,
    /// Timer host double.
    pub timers: FakeTimerHost,
    /// Renderer/GPU double.
    pub gpu: FakeGpu,
    /// Session double.
    pub session: ScriptedSession,
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Sim {
    /// Fixed deadline skew applied under [`PathologyToggles::timer_jitter`].
    pub const TIMER_JITTER: Duration = Duration::from_millis(1);

    /// Creates a simulation with no pathologies.
    #[must_use]
    pub fn new() -> Self {
        Self::with_toggles(PathologyToggles::default())
    }

    /// Creates a simulation with the given pathology toggles.
    #[must_use]
    pub fn with_toggles(toggles: PathologyToggles) -> Self {
        let jitter = if toggles.timer_jitter {
            Self::TIMER_JITTER
        } else {
            Duration::ZERO
        };
        Self {
            clock: FakeClock::new(),
            timers: FakeTimerHost::with_jitter(jitter),
            gpu: FakeGpu::with_toggles(toggles),
            session: ScriptedSession::new(),
        }
    }

    /// Borrows the fakes as a [`HostCtx`] for one scheduler dispatch.
    pub fn ctx(&mut self) -> HostCtx<'_> {
        HostCtx {
            renderer: &mut self.gpu,
            timers: &mut self.timers,
            session: &mut self.session,
            tracer: Tracer::none(),
        }
    }

    /// Advances simulated time by `delta` and returns the timers that came
    /// due, in deadline order. Dispatch each into the scheduler entry point
    /// matching its role.
    #[must_use]
    pub fn advance(&mut self, delta: Duration) -> alloc::vec::Vec<FiredTimer> {
        self.clock.advance(delta);
        let now = self.clock.now();
        self.gpu.set_now(now);
        self.timers.advance_to(now)
    }
}
