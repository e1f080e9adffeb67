// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The collaborator bundle passed into scheduler entry points.
//!
//! Cadence is single-threaded and cooperative: every scheduler entry point
//! runs as an event-loop callback to completion, so collaborators are
//! borrowed for exactly one call and no locking exists anywhere. [`HostCtx`]
//! is that borrow set — the renderer, the timer host, the session view, and
//! a tracer — assembled fresh by the host for each dispatch.

use crate::render::Renderer;
use crate::session::Session;
use crate::timer::TimerHost;
use crate::trace::Tracer;

/// Mutable borrows of everything the scheduler calls out to.
pub struct HostCtx<'a> {
    /// Composition and fence tracking.
    pub renderer: &'a mut dyn Renderer,
    /// Event-loop timers.
    pub timers: &'a mut dyn TimerHost,
    /// Session flags and unsafe-state recovery.
    pub session: &'a mut dyn Session,
    /// Diagnostics sink.
    pub tracer: Tracer<'a>,
}

impl core::fmt::Debug for HostCtx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HostCtx").finish_non_exhaustive()
    }
}
