// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for scheduling decisions.
//!
//! This module provides a [`TraceSink`] trait with per-event methods the
//! scheduler calls at each decision point. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! The warning-grade conditions from the scheduler's error model all map to
//! events here: a duplicate registration is [`TraceSink::on_duplicate_register`],
//! a render refused for session or damage reasons is
//! [`TraceSink::on_render_skipped`] with a [`SkipReason`], and a timer fire
//! that should not have happened is [`TraceSink::on_anomaly`].

use crate::monitor::MonitorId;
use crate::policy::PacingMode;
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a render was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The compositor does not hold the active session (VT switched away).
    SessionInactive,
    /// The compositor is in the unsafe no-real-output state.
    UnsafeState,
    /// The monitor is disabled.
    MonitorDisabled,
    /// No damage anywhere in the ring and no force frames owed.
    NoDamage,
    /// Tearing is active but no frame was scheduled while the pipeline was
    /// busy — nothing new to show.
    TearingIdle,
}

/// A defensive condition that should not occur if invariants hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anomaly {
    /// The vblank timer fired but no render was issued this cycle.
    VblankWithoutRender,
    /// The fence-poll timer fired while no frame was delayed.
    StaleFencePoll,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a monitor is registered.
#[derive(Clone, Copy, Debug)]
pub struct RegisterEvent {
    /// Which monitor.
    pub monitor: MonitorId,
    /// The pacing policy selected for it.
    pub mode: PacingMode,
}

/// Emitted when a render is delegated to the renderer.
#[derive(Clone, Copy, Debug)]
pub struct RenderEvent {
    /// Which monitor.
    pub monitor: MonitorId,
    /// The render will be presented immediately, without waiting for vblank.
    pub torn: bool,
    /// The renderer returned a completion fence.
    pub fenced: bool,
}

/// Emitted when the vblank timer is armed for a predicted deadline.
#[derive(Clone, Copy, Debug)]
pub struct VblankArmEvent {
    /// Which monitor.
    pub monitor: MonitorId,
    /// Predicted vblank deadline.
    pub deadline: HostTime,
    /// One-shot delay the timer was armed with (margin already subtracted).
    pub delay: Duration,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the scheduler.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a monitor is registered.
    fn on_registered(&mut self, e: &RegisterEvent) {
        _ = e;
    }

    /// Called when a registration is attempted for an already-registered
    /// monitor (warning grade; the call is a no-op).
    fn on_duplicate_register(&mut self, monitor: MonitorId) {
        _ = monitor;
    }

    /// Called when a monitor is unregistered.
    fn on_unregistered(&mut self, monitor: MonitorId) {
        _ = monitor;
    }

    /// Called when an external frame request is deferred to the next present.
    fn on_frame_deferred(&mut self, monitor: MonitorId) {
        _ = monitor;
    }

    /// Called when a render is skipped.
    fn on_render_skipped(&mut self, monitor: MonitorId, reason: SkipReason) {
        _ = (monitor, reason);
    }

    /// Called when a render is issued.
    fn on_render(&mut self, e: &RenderEvent) {
        _ = e;
    }

    /// Called when the vblank timer is armed.
    fn on_vblank_armed(&mut self, e: &VblankArmEvent) {
        _ = e;
    }

    /// Called when a vblank passes before the frame's fence signals.
    fn on_frame_delayed(&mut self, monitor: MonitorId) {
        _ = monitor;
    }

    /// Called when a delayed frame is re-rendered after GPU completion.
    fn on_catchup_render(&mut self, monitor: MonitorId) {
        _ = monitor;
    }

    /// Called for defensive conditions that should not occur (warning grade;
    /// the scheduler takes no action).
    fn on_anomaly(&mut self, monitor: MonitorId, anomaly: Anomaly) {
        _ = (monitor, anomaly);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RegisterEvent`].
    #[inline]
    pub fn registered(&mut self, e: &RegisterEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_registered(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a duplicate-registration warning.
    #[inline]
    pub fn duplicate_register(&mut self, monitor: MonitorId) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_duplicate_register(monitor);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = monitor;
        }
    }

    /// Emits an unregistration event.
    #[inline]
    pub fn unregistered(&mut self, monitor: MonitorId) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_unregistered(monitor);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = monitor;
        }
    }

    /// Emits a frame-deferral event.
    #[inline]
    pub fn frame_deferred(&mut self, monitor: MonitorId) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_deferred(monitor);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = monitor;
        }
    }

    /// Emits a render-skipped event.
    #[inline]
    pub fn render_skipped(&mut self, monitor: MonitorId, reason: SkipReason) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render_skipped(monitor, reason);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (monitor, reason);
        }
    }

    /// Emits a [`RenderEvent`].
    #[inline]
    pub fn render(&mut self, e: &RenderEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`VblankArmEvent`].
    #[inline]
    pub fn vblank_armed(&mut self, e: &VblankArmEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_vblank_armed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a frame-delayed event.
    #[inline]
    pub fn frame_delayed(&mut self, monitor: MonitorId) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_delayed(monitor);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = monitor;
        }
    }

    /// Emits a catch-up render event.
    #[inline]
    pub fn catchup_render(&mut self, monitor: MonitorId) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_catchup_render(monitor);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = monitor;
        }
    }

    /// Emits an anomaly warning.
    #[inline]
    pub fn anomaly(&mut self, monitor: MonitorId, anomaly: Anomaly) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_anomaly(monitor, anomaly);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (monitor, anomaly);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_accepts_every_event() {
        let mut sink = NoopSink;
        sink.on_registered(&RegisterEvent {
            monitor: MonitorId(0),
            mode: PacingMode::Fenced,
        });
        sink.on_render_skipped(MonitorId(0), SkipReason::NoDamage);
        sink.on_anomaly(MonitorId(0), Anomaly::VblankWithoutRender);
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame_delayed(MonitorId(1));
        tracer.render(&RenderEvent {
            monitor: MonitorId(1),
            torn: false,
            fenced: true,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct RecordingSink {
            skipped: Vec<(MonitorId, SkipReason)>,
        }
        impl TraceSink for RecordingSink {
            fn on_render_skipped(&mut self, monitor: MonitorId, reason: SkipReason) {
                self.skipped.push((monitor, reason));
            }
        }

        let mut sink = RecordingSink::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.render_skipped(MonitorId(2), SkipReason::NoDamage);
        drop(tracer);
        assert_eq!(sink.skipped, [(MonitorId(2), SkipReason::NoDamage)]);
    }
}
