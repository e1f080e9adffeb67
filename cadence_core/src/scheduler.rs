// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The presentation scheduler.
//!
//! [`PresentScheduler`] decides, per registered monitor, when to render a
//! new frame and when to hand it to the display, from asynchronous timing
//! signals on both sides: present completions and vblank predictions from
//! the display, completion fences from the GPU.
//!
//! # Per-monitor state machine (fenced pacing)
//!
//! ```text
//!            on_present accepted, render issued
//!   IDLE ────────────────────────────────────────► PUSHING
//!                                                     │ vblank timer armed
//!                                                     ▼
//!                                              WAITING_PRESENT
//!        next real present                            │ vblank fires before
//!   ◄─────────────────────────────────────────────────┤ the fence signals
//!                                                     ▼
//!                                                  DELAYED ──► fence-poll retries
//!                                                     │ gpu_done
//!                                                     ▼
//!                                               RENDER_AGAIN
//!        next on_present consumes                     │ delayed_frame_submitted
//!   ◄─────────────────────────────────────────────────┘ set; no duplicate render
//! ```
//!
//! Legacy-paced monitors bypass all of this: [`PresentScheduler::on_frame`]
//! renders on every backend tick and the deadline machinery stays disarmed.
//!
//! # Error model
//!
//! Duplicate registration is a traced no-op. Every other entry point
//! requires a registered monitor and panics otherwise — calling into the
//! scheduler for a monitor it has never seen is a compositor bug, not a
//! runtime condition. Session loss, missing damage, and stuck fences are
//! ordinary outcomes: traced, skipped, and bounded, never fatal.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::fence::FenceSlot;
use crate::host::HostCtx;
use crate::monitor::{BufferId, MonitorId, MonitorState};
use crate::policy::{PacingConfig, PacingMode};
use crate::time::HostTime;
use crate::timer::{TimerId, TimerRole};
use crate::timing::PresentEvent;
use crate::trace::{Anomaly, RegisterEvent, RenderEvent, SkipReason, VblankArmEvent};
use crate::vblank::{predict_next_vblank, timer_delay};

/// Private per-monitor bookkeeping.
#[derive(Debug)]
struct SchedulingRecord {
    mode: PacingMode,
    // Frame progress for the current cycle.
    rendered: bool,
    delayed: bool,
    delayed_frame_submitted: bool,
    actively_pushing: bool,
    // Catch-up renders still owed.
    force_frames: u32,
    last_present: Option<HostTime>,
    next_vblank: Option<HostTime>,
    fence: FenceSlot,
    vblank_timer: TimerId,
    fence_timer: TimerId,
    // Borrowed buffer associations for completion routing.
    buffers: Vec<BufferId>,
}

/// The per-output frame pacing engine.
///
/// One instance per compositor, owned by the compositor root and injected
/// into whatever needs to request frames. All entry points take the
/// monitor's state and a [`HostCtx`] of collaborators; the scheduler holds
/// only its own records between calls.
#[derive(Debug)]
pub struct PresentScheduler {
    config: PacingConfig,
    records: HashMap<MonitorId, SchedulingRecord>,
}

impl Default for PresentScheduler {
    fn default() -> Self {
        Self::new(PacingConfig::new())
    }
}

impl PresentScheduler {
    /// Creates a scheduler with the given pacing configuration.
    #[must_use]
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            records: HashMap::new(),
        }
    }

    /// Returns `true` if `monitor` is currently registered.
    #[must_use]
    pub fn is_registered(&self, monitor: MonitorId) -> bool {
        self.records.contains_key(&monitor)
    }

    /// Returns `true` if `monitor` is paced by backend frame ticks rather
    /// than vblank prediction. Unknown monitors report `true`: without a
    /// record there is nothing to predict with.
    #[must_use]
    pub fn is_legacy(&self, monitor: MonitorId) -> bool {
        self.records
            .get(&monitor)
            .is_none_or(|record| record.mode.is_legacy())
    }

    /// Registers a monitor, selecting its pacing policy from the backend
    /// capabilities it reports and creating its two timers.
    ///
    /// Registering an already-registered monitor is a traced no-op.
    pub fn register_monitor(&mut self, monitor: &MonitorState, ctx: &mut HostCtx<'_>) {
        if self.records.contains_key(&monitor.id) {
            ctx.tracer.duplicate_register(monitor.id);
            return;
        }

        let mode = PacingMode::from_caps(monitor.caps);
        let vblank_timer = ctx.timers.create(monitor.id, TimerRole::Vblank);
        let fence_timer = ctx.timers.create(monitor.id, TimerRole::FencePoll);

        self.records.insert(
            monitor.id,
            SchedulingRecord {
                mode,
                rendered: false,
                delayed: false,
                delayed_frame_submitted: false,
                actively_pushing: false,
                force_frames: self.config.startup_force_frames,
                last_present: None,
                next_vblank: None,
                fence: FenceSlot::empty(),
                vblank_timer,
                fence_timer,
                buffers: Vec::new(),
            },
        );

        ctx.tracer.registered(&RegisterEvent {
            monitor: monitor.id,
            mode,
        });
    }

    /// Unregisters a monitor: destroys both timers, releases any held
    /// fence, and erases the record.
    ///
    /// Callable at any point in the state machine; after it returns no
    /// timer callback for this monitor can observe scheduler state. A
    /// monitor that was never registered is a no-op.
    pub fn unregister_monitor(&mut self, monitor: MonitorId, ctx: &mut HostCtx<'_>) {
        let Some(mut record) = self.records.remove(&monitor) else {
            return;
        };

        ctx.timers.destroy(record.vblank_timer);
        ctx.timers.destroy(record.fence_timer);
        record.fence.clear(ctx.renderer);
        ctx.tracer.unregistered(monitor);
    }

    /// External request for a new frame (content changed).
    ///
    /// No-op while the monitor is actively tearing or legacy-paced — those
    /// paths render through their own route. While a frame is in flight and
    /// the last accepted present is recent, the request is deferred by
    /// guaranteeing one follow-up render on the next present instead of
    /// rendering immediately, which would overrun the display pipeline.
    /// Otherwise the present algorithm runs now, with no timestamp.
    ///
    /// # Panics
    ///
    /// Panics if the monitor is not registered.
    pub fn on_frame_needed(
        &mut self,
        monitor: &mut MonitorState,
        now: HostTime,
        ctx: &mut HostCtx<'_>,
    ) {
        let defer_window = self.config.defer_window;
        let record = self.record_mut(monitor.id);

        if monitor.tearing.actively_tearing || record.mode.is_legacy() {
            return;
        }

        let recent_present = record
            .last_present
            .is_some_and(|t| now.saturating_duration_since(t) < defer_window);
        if record.actively_pushing && recent_present {
            if record.force_frames < 1 {
                record.force_frames = 1;
            }
            ctx.tracer.frame_deferred(monitor.id);
            return;
        }

        self.on_present(monitor, &PresentEvent::synthetic(now), ctx);
    }

    /// The present algorithm: runs on every backend present-completion
    /// notification, and synthetically (without a timestamp) from
    /// [`Self::on_frame_needed`].
    ///
    /// # Panics
    ///
    /// Panics if the monitor is not registered.
    pub fn on_present(
        &mut self,
        monitor: &mut MonitorState,
        ev: &PresentEvent,
        ctx: &mut HostCtx<'_>,
    ) {
        let config = self.config;
        let record = self
            .records
            .get_mut(&monitor.id)
            .expect("no scheduling record for monitor");

        // Tearing and legacy monitors render through their own routes.
        if monitor.tearing.actively_tearing || record.mode.is_legacy() {
            record.actively_pushing = false;
            return;
        }

        // A catch-up render already happened out of band; this present is
        // its continuation, not a new cycle.
        if record.delayed_frame_submitted {
            record.delayed_frame_submitted = false;
            record.actively_pushing = false;
            return;
        }

        record.fence.clear(ctx.renderer);

        let force_effective = record
            .force_frames
            .saturating_add(monitor.force_full_frames);

        record.last_present = Some(ev.now);
        record.delayed = false;
        if record.force_frames > 0 {
            record.force_frames -= 1;
        }
        record.rendered = false;
        record.actively_pushing = true;

        if !monitor.damage.has_recent() && force_effective == 0 {
            record.actively_pushing = false;
            ctx.tracer.render_skipped(monitor.id, SkipReason::NoDamage);
            return;
        }

        // Only a real present timestamp gives us something to predict from;
        // the synthetic path renders without a deadline.
        if let Some(presented_at) = ev.presented_at {
            let refresh = ev.refresh.unwrap_or(monitor.refresh_interval);
            let deadline = predict_next_vblank(ev.now, presented_at, refresh);
            let delay = timer_delay(ev.now, deadline, config.vblank_safety_margin);
            record.next_vblank = Some(deadline);
            ctx.timers.arm(record.vblank_timer, delay);
            ctx.tracer.vblank_armed(&VblankArmEvent {
                monitor: monitor.id,
                deadline,
                delay,
            });
        }

        render_frame(record, monitor, ctx);
    }

    /// Raw backend frame tick, the legacy pacing route.
    ///
    /// Monitors on fenced pacing ignore it. Legacy monitors render on every
    /// tick, unconditionally — no damage, force-frame, or vblank gating;
    /// the backend itself paces the cadence.
    ///
    /// # Panics
    ///
    /// Panics if the monitor is not registered.
    pub fn on_frame(&mut self, monitor: &mut MonitorState, ctx: &mut HostCtx<'_>) {
        let record = self.record_mut(monitor.id);

        if !record.mode.is_legacy() {
            return;
        }

        render_frame(record, monitor, ctx);
    }

    /// Vblank timer callback: fires shortly before the predicted deadline.
    ///
    /// If the frame rendered and its fence already signaled (or it has
    /// none), the present will happen on schedule and nothing is done. If
    /// the fence has not signaled, the frame is marked delayed and the
    /// fence-poll timer starts. Firing with no render issued this cycle is
    /// a traced anomaly.
    ///
    /// # Panics
    ///
    /// Panics if the monitor is not registered.
    pub fn on_vblank_timer(&mut self, monitor: &mut MonitorState, ctx: &mut HostCtx<'_>) {
        let poll_interval = self.config.fence_poll_interval;
        let record = self.record_mut(monitor.id);

        if !record.rendered {
            ctx.tracer.anomaly(monitor.id, Anomaly::VblankWithoutRender);
            return;
        }

        match record.fence.handle() {
            Some(fence) if !ctx.renderer.fence_signaled(fence) => {
                record.delayed = true;
                ctx.timers.arm(record.fence_timer, poll_interval);
                ctx.tracer.frame_delayed(monitor.id);
            }
            // Fence signaled, or the render carried none: on schedule.
            _ => {}
        }
    }

    /// Fence-poll timer callback.
    ///
    /// Re-arms itself at the poll interval while the fence stays
    /// unsignaled; a stuck fence therefore polls at a fixed bounded cadence
    /// until the next accepted present unconditionally releases it. Once
    /// the fence signals this behaves exactly like [`Self::gpu_done`].
    ///
    /// # Panics
    ///
    /// Panics if the monitor is not registered.
    pub fn on_fence_timer(&mut self, monitor: &mut MonitorState, ctx: &mut HostCtx<'_>) {
        let poll_interval = self.config.fence_poll_interval;
        let record = self.record_mut(monitor.id);

        if !record.delayed {
            ctx.tracer.anomaly(monitor.id, Anomaly::StaleFencePoll);
            return;
        }

        if let Some(fence) = record.fence.handle()
            && !ctx.renderer.fence_signaled(fence)
        {
            let fence_timer = record.fence_timer;
            ctx.timers.arm(fence_timer, poll_interval);
            return;
        }

        self.gpu_done(monitor, ctx);
    }

    /// Out-of-band GPU completion for a delayed frame.
    ///
    /// Acts only when the predicted vblank already passed without the fence
    /// signaling: re-renders immediately so the frame is presented as soon
    /// as possible, and marks the cycle so the present notification that
    /// follows is absorbed as a continuation rather than starting fresh.
    ///
    /// # Panics
    ///
    /// Panics if the monitor is not registered.
    pub fn gpu_done(&mut self, monitor: &mut MonitorState, ctx: &mut HostCtx<'_>) {
        let record = self.record_mut(monitor.id);

        if !record.delayed {
            return;
        }

        record.delayed = false;
        ctx.timers.cancel(record.fence_timer);

        // If we finish before the next vblank somehow the display pipeline
        // will grumble, but the frame gets out.
        render_frame(record, monitor, ctx);
        record.delayed_frame_submitted = true;
        ctx.tracer.catchup_render(monitor.id);
    }

    /// Associates a buffer with a monitor for buffer-keyed completion
    /// routing. Idempotent per buffer.
    ///
    /// # Panics
    ///
    /// Panics if the monitor is not registered.
    pub fn register_buffer(&mut self, buffer: BufferId, monitor: MonitorId) {
        let record = self.record_mut(monitor);
        if !record.buffers.contains(&buffer) {
            record.buffers.push(buffer);
        }
    }

    /// Removes a buffer association from every record. Idempotent; unknown
    /// buffers are a no-op.
    pub fn drop_buffer(&mut self, buffer: BufferId) {
        for record in self.records.values_mut() {
            record.buffers.retain(|b| *b != buffer);
        }
    }

    /// The predicted vblank deadline for `monitor`'s current cycle, if one
    /// was computed. Useful for HUDs and debug overlays.
    #[must_use]
    pub fn predicted_vblank(&self, monitor: MonitorId) -> Option<HostTime> {
        self.records
            .get(&monitor)
            .and_then(|record| record.next_vblank)
    }

    /// Resolves a buffer-keyed GPU completion to the owning monitor, for
    /// routing into [`Self::gpu_done`].
    #[must_use]
    pub fn monitor_for_buffer(&self, buffer: BufferId) -> Option<MonitorId> {
        self.records
            .iter()
            .find(|(_, record)| record.buffers.contains(&buffer))
            .map(|(id, _)| *id)
    }

    fn record_mut(&mut self, monitor: MonitorId) -> &mut SchedulingRecord {
        self.records
            .get_mut(&monitor)
            .expect("no scheduling record for monitor")
    }
}

/// The render step: guard, tearing bookkeeping, delegate, store the fence.
fn render_frame(
    record: &mut SchedulingRecord,
    monitor: &mut MonitorState,
    ctx: &mut HostCtx<'_>,
) {
    let session = ctx.session.state();
    if !session.active || session.unsafe_state {
        let reason = if session.unsafe_state {
            SkipReason::UnsafeState
        } else {
            SkipReason::SessionInactive
        };
        ctx.tracer.render_skipped(monitor.id, reason);

        if session.unsafe_state && ctx.session.has_real_output() {
            ctx.session.leave_unsafe_state();
        }
        return;
    }

    if !monitor.enabled {
        ctx.tracer
            .render_skipped(monitor.id, SkipReason::MonitorDisabled);
        return;
    }

    // The recheck can revoke the solitary grant.
    ctx.renderer.recheck_solitary(monitor);

    monitor.tearing.busy = false;

    if monitor.tearing.actively_tearing && monitor.solitary_client.is_some() {
        if !monitor.tearing.frame_scheduled_while_busy {
            ctx.tracer
                .render_skipped(monitor.id, SkipReason::TearingIdle);
            return;
        }
        monitor.tearing.next_render_torn = true;
        monitor.tearing.frame_scheduled_while_busy = false;
    }

    let want_fence = !record.mode.is_legacy();
    let torn = monitor.tearing.next_render_torn;
    let fence = ctx.renderer.render_monitor(monitor, want_fence);
    let fenced = fence.is_some();
    record.fence.replace(ctx.renderer, fence);
    record.rendered = true;

    ctx.tracer.render(&RenderEvent {
        monitor: monitor.id,
        torn,
        fenced,
    });
}
