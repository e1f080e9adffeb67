// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer/GPU double.

use alloc::vec::Vec;

use cadence_core::fence::FenceHandle;
use cadence_core::monitor::{MonitorId, MonitorState};
use cadence_core::render::Renderer;
use cadence_core::time::{Duration, HostTime};

use crate::PathologyToggles;

/// One recorded `render_monitor` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderCall {
    /// Which monitor was rendered.
    pub monitor: MonitorId,
    /// Whether a fence was requested.
    pub want_fence: bool,
    /// Whether the render was flagged as a torn present.
    pub torn: bool,
}

#[derive(Clone, Copy, Debug)]
struct PendingFence {
    fence: FenceHandle,
    signal_at: Option<HostTime>,
}

/// A [`Renderer`] double that records calls and models fence completion.
///
/// Renders consume the monitor's damage (rotate the ring) and mint fences
/// that signal `fence_latency` after the render — or never, under
/// [`PathologyToggles::gpu_stall`], until a test calls [`Self::signal`].
#[derive(Debug)]
pub struct FakeGpu {
    toggles: PathologyToggles,
    now: HostTime,
    fence_latency: Duration,
    next_fence: u64,
    revoke_solitary: bool,
    pending: Vec<PendingFence>,
    released: Vec<FenceHandle>,
    renders: Vec<RenderCall>,
    solitary_rechecks: u32,
}

impl Default for FakeGpu {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGpu {
    /// Default GPU completion latency after a render.
    pub const DEFAULT_FENCE_LATENCY: Duration = Duration::from_millis(4);

    /// Creates a GPU double with no pathologies.
    #[must_use]
    pub fn new() -> Self {
        Self::with_toggles(PathologyToggles::default())
    }

    /// Creates a GPU double with the given pathology toggles.
    #[must_use]
    pub fn with_toggles(toggles: PathologyToggles) -> Self {
        Self {
            toggles,
            now: HostTime(0),
            fence_latency: Self::DEFAULT_FENCE_LATENCY,
            next_fence: 0,
            revoke_solitary: false,
            pending: Vec::new(),
            released: Vec::new(),
            renders: Vec::new(),
            solitary_rechecks: 0,
        }
    }

    /// Sets the GPU completion latency for subsequent renders.
    pub fn set_fence_latency(&mut self, latency: Duration) {
        self.fence_latency = latency;
    }

    /// Makes every solitary recheck revoke the monitor's grant.
    pub fn set_revoke_solitary(&mut self, revoke: bool) {
        self.revoke_solitary = revoke;
    }

    /// Moves the GPU's view of time (fences with due signal times become
    /// signaled).
    pub fn set_now(&mut self, now: HostTime) {
        self.now = now;
    }

    /// Forces `fence` to signal immediately, e.g. to model an out-of-band
    /// completion callback under [`PathologyToggles::gpu_stall`].
    pub fn signal(&mut self, fence: FenceHandle) {
        if let Some(pending) = self.pending.iter_mut().find(|p| p.fence == fence) {
            pending.signal_at = Some(self.now);
        }
    }

    /// The recorded render calls, in order.
    #[must_use]
    pub fn renders(&self) -> &[RenderCall] {
        &self.renders
    }

    /// Number of renders issued.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.renders.len()
    }

    /// Fences released so far, in order.
    #[must_use]
    pub fn released(&self) -> &[FenceHandle] {
        &self.released
    }

    /// The most recently minted fence, if it has not been released.
    #[must_use]
    pub fn last_fence(&self) -> Option<FenceHandle> {
        self.pending.last().map(|p| p.fence)
    }

    /// Number of `recheck_solitary` calls observed.
    #[must_use]
    pub fn solitary_rechecks(&self) -> u32 {
        self.solitary_rechecks
    }
}

impl Renderer for FakeGpu {
    fn render_monitor(
        &mut self,
        monitor: &mut MonitorState,
        want_fence: bool,
    ) -> Option<FenceHandle> {
        self.renders.push(RenderCall {
            monitor: monitor.id,
            want_fence,
            torn: monitor.tearing.next_render_torn,
        });
        monitor.damage.rotate();
        monitor.tearing.next_render_torn = false;

        if !want_fence {
            return None;
        }

        self.next_fence += 1;
        let fence = FenceHandle(self.next_fence);
        let signal_at = if self.toggles.gpu_stall {
            None
        } else {
            self.now.checked_add(self.fence_latency)
        };
        self.pending.push(PendingFence { fence, signal_at });
        Some(fence)
    }

    fn recheck_solitary(&mut self, monitor: &mut MonitorState) {
        self.solitary_rechecks += 1;
        if self.revoke_solitary {
            monitor.solitary_client = None;
        }
    }

    fn fence_signaled(&mut self, fence: FenceHandle) -> bool {
        self.pending
            .iter()
            .find(|p| p.fence == fence)
            .is_some_and(|p| p.signal_at.is_some_and(|t| t <= self.now))
    }

    fn release_fence(&mut self, fence: FenceHandle) {
        self.released.push(fence);
        self.pending.retain(|p| p.fence != fence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::policy::BackendCaps;

    fn monitor() -> MonitorState {
        MonitorState::new(MonitorId(1), BackendCaps::full())
    }

    #[test]
    fn fences_signal_after_latency() {
        let mut gpu = FakeGpu::new();
        let mut monitor = monitor();
        let fence = gpu.render_monitor(&mut monitor, true).unwrap();

        assert!(!gpu.fence_signaled(fence));
        gpu.set_now(HostTime(4_000_000));
        assert!(gpu.fence_signaled(fence));
    }

    #[test]
    fn stalled_fences_need_an_explicit_signal() {
        let mut gpu = FakeGpu::with_toggles(PathologyToggles {
            gpu_stall: true,
            ..PathologyToggles::default()
        });
        let mut monitor = monitor();
        let fence = gpu.render_monitor(&mut monitor, true).unwrap();

        gpu.set_now(HostTime(1_000_000_000));
        assert!(!gpu.fence_signaled(fence), "stalled fence never self-signals");
        gpu.signal(fence);
        assert!(gpu.fence_signaled(fence));
    }

    #[test]
    fn render_consumes_damage_and_torn_flag() {
        let mut gpu = FakeGpu::new();
        let mut monitor = monitor();
        monitor.damage.mark();
        monitor.tearing.next_render_torn = true;

        let fence = gpu.render_monitor(&mut monitor, false);
        assert_eq!(fence, None);
        assert!(!monitor.damage.has_current());
        assert!(!monitor.tearing.next_render_torn);
        assert_eq!(
            gpu.renders(),
            [RenderCall {
                monitor: MonitorId(1),
                want_fence: false,
                torn: true,
            }]
        );
    }

    #[test]
    fn released_fences_stop_reporting() {
        let mut gpu = FakeGpu::new();
        let mut monitor = monitor();
        let fence = gpu.render_monitor(&mut monitor, true).unwrap();
        gpu.set_now(HostTime(10_000_000));
        gpu.release_fence(fence);
        assert!(!gpu.fence_signaled(fence));
        assert_eq!(gpu.released(), [fence]);
    }
}
