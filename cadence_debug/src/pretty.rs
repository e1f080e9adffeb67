// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use cadence_core::monitor::MonitorId;
use cadence_core::trace::{
    Anomaly, RegisterEvent, RenderEvent, SkipReason, TraceSink, VblankArmEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

fn skip_reason_name(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::SessionInactive => "session-inactive",
        SkipReason::UnsafeState => "unsafe-state",
        SkipReason::MonitorDisabled => "disabled",
        SkipReason::NoDamage => "no-damage",
        SkipReason::TearingIdle => "tearing-idle",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_registered(&mut self, e: &RegisterEvent) {
        let _ = writeln!(
            self.writer,
            "[register] monitor={} mode={:?}",
            e.monitor.0, e.mode,
        );
    }

    fn on_duplicate_register(&mut self, monitor: MonitorId) {
        let _ = writeln!(
            self.writer,
            "[register] monitor={} WARN duplicate registration",
            monitor.0,
        );
    }

    fn on_unregistered(&mut self, monitor: MonitorId) {
        let _ = writeln!(self.writer, "[unregister] monitor={}", monitor.0);
    }

    fn on_frame_deferred(&mut self, monitor: MonitorId) {
        let _ = writeln!(
            self.writer,
            "[defer] monitor={} follow-up guaranteed on next present",
            monitor.0,
        );
    }

    fn on_render_skipped(&mut self, monitor: MonitorId, reason: SkipReason) {
        let _ = writeln!(
            self.writer,
            "[skip] monitor={} reason={}",
            monitor.0,
            skip_reason_name(reason),
        );
    }

    fn on_render(&mut self, e: &RenderEvent) {
        let _ = writeln!(
            self.writer,
            "[render] monitor={} torn={} fenced={}",
            e.monitor.0, e.torn, e.fenced,
        );
    }

    fn on_vblank_armed(&mut self, e: &VblankArmEvent) {
        let _ = writeln!(
            self.writer,
            "[vblank] monitor={} deadline={:.1}µs delay={:.1}µs",
            e.monitor.0,
            e.deadline.ticks() as f64 / 1000.0,
            e.delay.ticks() as f64 / 1000.0,
        );
    }

    fn on_frame_delayed(&mut self, monitor: MonitorId) {
        let _ = writeln!(
            self.writer,
            "[delayed] monitor={} vblank passed before fence",
            monitor.0,
        );
    }

    fn on_catchup_render(&mut self, monitor: MonitorId) {
        let _ = writeln!(self.writer, "[catchup] monitor={}", monitor.0);
    }

    fn on_anomaly(&mut self, monitor: MonitorId, anomaly: Anomaly) {
        let _ = writeln!(
            self.writer,
            "[anomaly] monitor={} WARN {:?}",
            monitor.0, anomaly,
        );
    }
}
