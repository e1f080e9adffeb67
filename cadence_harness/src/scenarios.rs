// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scheduler scenarios driven through the fakes.

use alloc::vec::Vec;

use cadence_core::monitor::{MonitorId, MonitorState};
use cadence_core::policy::{BackendCaps, PacingConfig, PacingMode};
use cadence_core::scheduler::PresentScheduler;
use cadence_core::time::{Duration, HostTime};
use cadence_core::timer::TimerRole;
use cadence_core::timing::PresentEvent;

use crate::{FiredTimer, PacingGrade, PacingSample, PacingTracker, PathologyToggles, Sim};

fn quiet_config() -> PacingConfig {
    PacingConfig {
        startup_force_frames: 0,
        ..PacingConfig::new()
    }
}

fn fenced_monitor(id: u32) -> MonitorState {
    let mut monitor = MonitorState::new(MonitorId(id), BackendCaps::full());
    monitor.refresh_interval = Duration::from_millis(16);
    monitor
}

fn dispatch(
    sched: &mut PresentScheduler,
    monitor: &mut MonitorState,
    sim: &mut Sim,
    fired: Vec<FiredTimer>,
) {
    for fire in fired {
        assert_eq!(fire.monitor, monitor.id, "single-monitor scenario");
        match fire.role {
            TimerRole::Vblank => sched.on_vblank_timer(monitor, &mut sim.ctx()),
            TimerRole::FencePoll => sched.on_fence_timer(monitor, &mut sim.ctx()),
        }
    }
}

fn present_now(sched: &mut PresentScheduler, monitor: &mut MonitorState, sim: &mut Sim) {
    let now = sim.clock.now();
    let ev = PresentEvent::presented(now, now, None);
    sched.on_present(monitor, &ev, &mut sim.ctx());
}

#[test]
fn registration_is_idempotent() {
    let mut sim = Sim::new();
    let mut sched = PresentScheduler::new(quiet_config());
    let monitor = fenced_monitor(1);

    sched.register_monitor(&monitor, &mut sim.ctx());
    sched.register_monitor(&monitor, &mut sim.ctx());

    assert_eq!(sim.timers.timer_count(), 2, "no duplicate timers");
    assert!(sched.is_registered(monitor.id));
}

#[test]
fn delayed_frame_round_trip() {
    let mut sim = Sim::new();
    // GPU far slower than one refresh: the vblank will beat the fence.
    sim.gpu.set_fence_latency(Duration::from_millis(30));
    let mut sched = PresentScheduler::new(quiet_config());
    let mut monitor = fenced_monitor(1);
    sched.register_monitor(&monitor, &mut sim.ctx());

    // t=1ms: present accepted, render issued, vblank timer armed 500µs
    // before the predicted deadline at t=17ms.
    let _ = sim.advance(Duration::from_millis(1));
    monitor.damage.mark();
    present_now(&mut sched, &mut monitor, &mut sim);
    assert_eq!(sim.gpu.render_count(), 1);
    assert!(sim.gpu.renders()[0].want_fence);
    assert_eq!(
        sim.timers.deadline_for(monitor.id, TimerRole::Vblank),
        Some(HostTime(16_500_000))
    );

    // t=17ms: vblank fires, fence (due t=31ms) unsignaled → delayed, the
    // fence poll starts.
    let fired = sim.advance(Duration::from_millis(16));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].role, TimerRole::Vblank);
    dispatch(&mut sched, &mut monitor, &mut sim, fired);
    assert!(sim.timers.deadline_for(monitor.id, TimerRole::FencePoll).is_some());
    assert_eq!(sim.gpu.render_count(), 1, "no render at the missed vblank");

    // Two stuck polls: the timer re-arms at the fixed cadence each time.
    for _ in 0..2 {
        let fired = sim.advance(Duration::from_micros(300));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].role, TimerRole::FencePoll);
        dispatch(&mut sched, &mut monitor, &mut sim, fired);
        assert_eq!(sim.gpu.render_count(), 1);
        assert!(
            sim.timers
                .deadline_for(monitor.id, TimerRole::FencePoll)
                .is_some(),
            "poll must stay armed while the fence is stuck"
        );
    }

    // t≈31.6ms: the fence has signaled; the next poll is the completion
    // signal and triggers the catch-up render.
    let fired = sim.advance(Duration::from_millis(14));
    dispatch(&mut sched, &mut monitor, &mut sim, fired);
    assert_eq!(sim.gpu.render_count(), 2, "catch-up render issued");

    // The present that follows is the catch-up frame reaching the screen:
    // absorbed, no new render.
    present_now(&mut sched, &mut monitor, &mut sim);
    assert_eq!(sim.gpu.render_count(), 2);

    // The cycle after that starts fresh.
    let _ = sim.advance(Duration::from_millis(16));
    monitor.damage.mark();
    present_now(&mut sched, &mut monitor, &mut sim);
    assert_eq!(sim.gpu.render_count(), 3);
}

#[test]
fn unregister_mid_delay_leaves_nothing_armed() {
    let mut sim = Sim::new();
    sim.gpu.set_fence_latency(Duration::from_millis(30));
    let mut sched = PresentScheduler::new(quiet_config());
    let mut monitor = fenced_monitor(1);
    sched.register_monitor(&monitor, &mut sim.ctx());

    let _ = sim.advance(Duration::from_millis(1));
    monitor.damage.mark();
    present_now(&mut sched, &mut monitor, &mut sim);
    let fence = sim.gpu.last_fence().expect("render minted a fence");

    let fired = sim.advance(Duration::from_millis(16));
    dispatch(&mut sched, &mut monitor, &mut sim, fired);

    // Mid-DELAYED, with the fence poll armed, tear the monitor down.
    sched.unregister_monitor(monitor.id, &mut sim.ctx());
    assert!(!sched.is_registered(monitor.id));
    assert_eq!(sim.timers.timer_count(), 0, "both timers destroyed");
    assert_eq!(sim.timers.armed_count(), 0);
    assert_eq!(sim.gpu.released(), [fence], "held fence released");

    // Nothing fires later.
    assert!(sim.advance(Duration::from_millis(50)).is_empty());
}

#[test]
fn legacy_output_is_paced_by_frame_ticks_alone() {
    let mut sim = Sim::new();
    let mut sched = PresentScheduler::new(quiet_config());
    let mut monitor = MonitorState::new(MonitorId(1), BackendCaps::tick_only());
    sched.register_monitor(&monitor, &mut sim.ctx());
    assert!(sched.is_legacy(monitor.id));

    // Neither the frame-request path nor present notifications render.
    monitor.damage.mark();
    sched.on_frame_needed(&mut monitor, sim.clock.now(), &mut sim.ctx());
    present_now(&mut sched, &mut monitor, &mut sim);
    assert_eq!(sim.gpu.render_count(), 0);

    // Raw ticks render unconditionally, even with no damage, and never
    // request fences or arm timers.
    for _ in 0..3 {
        let _ = sim.advance(Duration::from_millis(16));
        sched.on_frame(&mut monitor, &mut sim.ctx());
    }
    assert_eq!(sim.gpu.render_count(), 3);
    assert!(sim.gpu.renders().iter().all(|r| !r.want_fence));
    assert_eq!(sim.timers.armed_count(), 0);
}

#[test]
fn stalled_gpu_polls_at_bounded_cadence_until_superseded() {
    let mut sim = Sim::with_toggles(PathologyToggles {
        gpu_stall: true,
        ..PathologyToggles::default()
    });
    let mut sched = PresentScheduler::new(quiet_config());
    let mut monitor = fenced_monitor(1);
    sched.register_monitor(&monitor, &mut sim.ctx());

    let _ = sim.advance(Duration::from_millis(1));
    monitor.damage.mark();
    present_now(&mut sched, &mut monitor, &mut sim);
    let stuck_fence = sim.gpu.last_fence().expect("render minted a fence");

    let fired = sim.advance(Duration::from_millis(16));
    dispatch(&mut sched, &mut monitor, &mut sim, fired);

    // The fence never signals; each poll re-arms exactly one poll.
    for _ in 0..8 {
        let fired = sim.advance(Duration::from_micros(300));
        assert_eq!(fired.len(), 1, "fixed poll cadence, no pile-up");
        dispatch(&mut sched, &mut monitor, &mut sim, fired);
    }
    assert_eq!(sim.gpu.render_count(), 1, "stuck fence never re-renders");

    // The next accepted present supersedes the stuck cycle: the fence is
    // released unconditionally and a fresh render goes out.
    monitor.damage.mark();
    present_now(&mut sched, &mut monitor, &mut sim);
    assert!(sim.gpu.released().contains(&stuck_fence));
    assert_eq!(sim.gpu.render_count(), 2);
}

#[test]
fn timer_jitter_skews_the_armed_deadline() {
    let mut sim = Sim::with_toggles(PathologyToggles {
        timer_jitter: true,
        ..PathologyToggles::default()
    });
    let mut sched = PresentScheduler::new(quiet_config());
    let mut monitor = fenced_monitor(1);
    sched.register_monitor(&monitor, &mut sim.ctx());

    let _ = sim.advance(Duration::from_millis(1));
    monitor.damage.mark();
    present_now(&mut sched, &mut monitor, &mut sim);

    // Nominal deadline t=16.5ms, plus the 1ms pathology skew.
    assert_eq!(
        sim.timers.deadline_for(monitor.id, TimerRole::Vblank),
        Some(HostTime(17_500_000))
    );
}

#[test]
fn vblank_prediction_tracks_varying_refresh_hints() {
    let mut sim = Sim::with_toggles(PathologyToggles {
        vary_refresh: true,
        ..PathologyToggles::default()
    });
    let mut sched = PresentScheduler::new(quiet_config());
    let mut monitor = fenced_monitor(1);
    sched.register_monitor(&monitor, &mut sim.ctx());

    let hints = [Duration::from_millis(20), Duration::from_millis(10)];
    let mut expected = Vec::new();
    let mut observed = Vec::new();
    for hint in hints {
        let _ = sim.advance(Duration::from_millis(25));
        monitor.damage.mark();
        let now = sim.clock.now();
        let ev = PresentEvent::presented(now, now, Some(hint));
        sched.on_present(&mut monitor, &ev, &mut sim.ctx());

        expected.push(now + hint - Duration::from_micros(500));
        observed.push(
            sim.timers
                .deadline_for(monitor.id, TimerRole::Vblank)
                .expect("vblank timer armed"),
        );
    }
    assert_eq!(observed, expected, "deadline follows the per-event hint");
}

#[test]
fn two_monitors_route_timers_independently() {
    let mut sim = Sim::new();
    sim.gpu.set_fence_latency(Duration::from_millis(30));
    let mut sched = PresentScheduler::new(quiet_config());
    let mut left = fenced_monitor(1);
    let mut right = fenced_monitor(2);
    sched.register_monitor(&left, &mut sim.ctx());
    sched.register_monitor(&right, &mut sim.ctx());

    let _ = sim.advance(Duration::from_millis(1));
    left.damage.mark();
    present_now(&mut sched, &mut left, &mut sim);

    // Only the left monitor's vblank timer comes due.
    let fired = sim.advance(Duration::from_millis(16));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].monitor, left.id);
    for fire in fired {
        match fire.role {
            TimerRole::Vblank => sched.on_vblank_timer(&mut left, &mut sim.ctx()),
            TimerRole::FencePoll => sched.on_fence_timer(&mut left, &mut sim.ctx()),
        }
    }
    assert!(sim.timers.deadline_for(right.id, TimerRole::Vblank).is_none());

    // The right monitor still schedules normally.
    right.damage.mark();
    present_now(&mut sched, &mut right, &mut sim);
    assert_eq!(sim.gpu.render_count(), 2, "one render per monitor");
}

#[test]
fn session_loss_mid_stream_skips_until_restored() {
    let mut sim = Sim::new();
    let mut sched = PresentScheduler::new(quiet_config());
    let mut monitor = fenced_monitor(1);
    sched.register_monitor(&monitor, &mut sim.ctx());

    let _ = sim.advance(Duration::from_millis(1));
    monitor.damage.mark();
    present_now(&mut sched, &mut monitor, &mut sim);
    assert_eq!(sim.gpu.render_count(), 1);

    // VT switch away: presents keep arriving but nothing renders.
    sim.session.state.active = false;
    let _ = sim.advance(Duration::from_millis(16));
    monitor.damage.mark();
    present_now(&mut sched, &mut monitor, &mut sim);
    assert_eq!(sim.gpu.render_count(), 1);

    // VT switch back: the still-damaged output renders again.
    sim.session.state.active = true;
    let _ = sim.advance(Duration::from_millis(16));
    present_now(&mut sched, &mut monitor, &mut sim);
    assert_eq!(sim.gpu.render_count(), 2);
}

#[test]
fn pacing_tracker_grades_a_clean_fenced_stream() {
    let mut sim = Sim::new();
    let mut sched = PresentScheduler::new(quiet_config());
    let mut monitor = fenced_monitor(1);
    sched.register_monitor(&monitor, &mut sim.ctx());

    let mut tracker = PacingTracker::<16>::new(16.0);
    let mut last_present = sim.clock.now();
    let mut report = None;
    for _ in 0..20 {
        let _ = sim.advance(Duration::from_millis(16));
        monitor.damage.mark();
        present_now(&mut sched, &mut monitor, &mut sim);

        let now = sim.clock.now();
        let delta_ms = now.saturating_duration_since(last_present).ticks() as f64 / 1_000_000.0;
        last_present = now;
        report = Some(tracker.observe(PacingSample {
            mode: PacingMode::Fenced,
            delta_ms,
            target_ms: 16.0,
            missed: false,
        }));
    }
    assert_eq!(report.unwrap().grade, PacingGrade::A);
}
