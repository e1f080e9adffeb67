// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecordingSink`] implements [`TraceSink`] and stores every event as a
//! [`RecordedEvent`] in arrival order. Scheduler decisions are per-frame,
//! not per-layer, so plain enum values beat a compact encoding: tests match
//! on them directly and the Chrome exporter reads them back without a
//! decode step.

use cadence_core::monitor::MonitorId;
use cadence_core::policy::PacingMode;
use cadence_core::time::{Duration, HostTime};
use cadence_core::trace::{
    Anomaly, RegisterEvent, RenderEvent, SkipReason, TraceSink, VblankArmEvent,
};

/// One recorded scheduler event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A monitor was registered.
    Registered {
        /// Which monitor.
        monitor: MonitorId,
        /// Its selected pacing policy.
        mode: PacingMode,
    },
    /// A duplicate registration was refused.
    DuplicateRegister {
        /// Which monitor.
        monitor: MonitorId,
    },
    /// A monitor was unregistered.
    Unregistered {
        /// Which monitor.
        monitor: MonitorId,
    },
    /// An external frame request was deferred to the next present.
    FrameDeferred {
        /// Which monitor.
        monitor: MonitorId,
    },
    /// A render was skipped.
    RenderSkipped {
        /// Which monitor.
        monitor: MonitorId,
        /// Why.
        reason: SkipReason,
    },
    /// A render was issued.
    Render {
        /// Which monitor.
        monitor: MonitorId,
        /// Presented without waiting for vblank.
        torn: bool,
        /// The renderer returned a completion fence.
        fenced: bool,
    },
    /// The vblank timer was armed.
    VblankArmed {
        /// Which monitor.
        monitor: MonitorId,
        /// Predicted deadline.
        deadline: HostTime,
        /// Armed delay.
        delay: Duration,
    },
    /// A vblank passed before the fence signaled.
    FrameDelayed {
        /// Which monitor.
        monitor: MonitorId,
    },
    /// A delayed frame was re-rendered after GPU completion.
    CatchupRender {
        /// Which monitor.
        monitor: MonitorId,
    },
    /// A defensive anomaly was observed.
    Anomaly {
        /// Which monitor.
        monitor: MonitorId,
        /// Which condition.
        anomaly: Anomaly,
    },
}

impl RecordedEvent {
    /// The monitor this event concerns.
    #[must_use]
    pub const fn monitor(&self) -> MonitorId {
        match self {
            Self::Registered { monitor, .. }
            | Self::DuplicateRegister { monitor }
            | Self::Unregistered { monitor }
            | Self::FrameDeferred { monitor }
            | Self::RenderSkipped { monitor, .. }
            | Self::Render { monitor, .. }
            | Self::VblankArmed { monitor, .. }
            | Self::FrameDelayed { monitor }
            | Self::CatchupRender { monitor }
            | Self::Anomaly { monitor, .. } => *monitor,
        }
    }
}

/// A [`TraceSink`] that stores every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<RecordedEvent>,
}

impl RecordingSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in arrival order.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl TraceSink for RecordingSink {
    fn on_registered(&mut self, e: &RegisterEvent) {
        self.events.push(RecordedEvent::Registered {
            monitor: e.monitor,
            mode: e.mode,
        });
    }

    fn on_duplicate_register(&mut self, monitor: MonitorId) {
        self.events.push(RecordedEvent::DuplicateRegister { monitor });
    }

    fn on_unregistered(&mut self, monitor: MonitorId) {
        self.events.push(RecordedEvent::Unregistered { monitor });
    }

    fn on_frame_deferred(&mut self, monitor: MonitorId) {
        self.events.push(RecordedEvent::FrameDeferred { monitor });
    }

    fn on_render_skipped(&mut self, monitor: MonitorId, reason: SkipReason) {
        self.events
            .push(RecordedEvent::RenderSkipped { monitor, reason });
    }

    fn on_render(&mut self, e: &RenderEvent) {
        self.events.push(RecordedEvent::Render {
            monitor: e.monitor,
            torn: e.torn,
            fenced: e.fenced,
        });
    }

    fn on_vblank_armed(&mut self, e: &VblankArmEvent) {
        self.events.push(RecordedEvent::VblankArmed {
            monitor: e.monitor,
            deadline: e.deadline,
            delay: e.delay,
        });
    }

    fn on_frame_delayed(&mut self, monitor: MonitorId) {
        self.events.push(RecordedEvent::FrameDelayed { monitor });
    }

    fn on_catchup_render(&mut self, monitor: MonitorId) {
        self.events.push(RecordedEvent::CatchupRender { monitor });
    }

    fn on_anomaly(&mut self, monitor: MonitorId, anomaly: Anomaly) {
        self.events.push(RecordedEvent::Anomaly { monitor, anomaly });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_events_in_order() {
        let mut sink = RecordingSink::new();
        sink.on_registered(&RegisterEvent {
            monitor: MonitorId(1),
            mode: PacingMode::Fenced,
        });
        sink.on_render(&RenderEvent {
            monitor: MonitorId(1),
            torn: false,
            fenced: true,
        });
        sink.on_frame_delayed(MonitorId(1));

        assert_eq!(
            sink.events(),
            [
                RecordedEvent::Registered {
                    monitor: MonitorId(1),
                    mode: PacingMode::Fenced,
                },
                RecordedEvent::Render {
                    monitor: MonitorId(1),
                    torn: false,
                    fenced: true,
                },
                RecordedEvent::FrameDelayed {
                    monitor: MonitorId(1),
                },
            ]
        );
    }

    #[test]
    fn monitor_accessor_covers_all_variants() {
        let events = [
            RecordedEvent::DuplicateRegister {
                monitor: MonitorId(3),
            },
            RecordedEvent::RenderSkipped {
                monitor: MonitorId(3),
                reason: SkipReason::NoDamage,
            },
            RecordedEvent::Anomaly {
                monitor: MonitorId(3),
                anomaly: Anomaly::VblankWithoutRender,
            },
        ];
        for event in events {
            assert_eq!(event.monitor(), MonitorId(3));
        }
    }

    #[test]
    fn empty_recorder_reports_empty() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());
        assert_eq!(sink.len(), 0);
    }
}
