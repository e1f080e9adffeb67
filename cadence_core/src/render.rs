// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer contract.
//!
//! The scheduler decides *when* to draw; the [`Renderer`] does the drawing.
//! One implementation wraps the compositor's real composition pipeline;
//! test doubles count calls and mint fake fences.
//!
//! Fence queries live on this trait because fences originate here: a render
//! with `want_fence` mints one on the renderer's GPU timeline, and only the
//! renderer can poll or retire it.

use crate::fence::FenceHandle;
use crate::monitor::MonitorState;

/// Performs composition for a monitor and tracks the GPU completion fences
/// its renders mint.
pub trait Renderer {
    /// Composites one frame for `monitor`.
    ///
    /// When `want_fence` is set the renderer returns a fence that signals
    /// once the GPU finishes the submitted work; `None` means no fence is
    /// available for this render (e.g. direct scanout bypassed composition).
    /// The renderer is expected to consume the monitor's current damage.
    fn render_monitor(&mut self, monitor: &mut MonitorState, want_fence: bool)
    -> Option<FenceHandle>;

    /// Re-evaluates whether a single fullscreen client may claim direct
    /// scanout on `monitor`, updating `monitor.solitary_client` (possibly
    /// revoking it).
    fn recheck_solitary(&mut self, monitor: &mut MonitorState);

    /// Returns `true` once the GPU work guarded by `fence` has completed.
    fn fence_signaled(&mut self, fence: FenceHandle) -> bool;

    /// Retires a fence. The handle must not be queried again afterwards.
    fn release_fence(&mut self, fence: FenceHandle);
}
