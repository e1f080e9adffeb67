// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-output presentation scheduling for timing-aware compositors.
//!
//! `cadence_core` decides, for each display output, *when* to render a new
//! frame and *when* to hand it to the display, from uncertain and
//! asynchronous timing signals on both sides: present completions and
//! refresh hints from the display, completion fences from the GPU. It is
//! `no_std` compatible (with `alloc`) and owns no platform resources —
//! clocks, timers, and composition are collaborators behind traits.
//!
//! # Architecture
//!
//! The crate is organized around the scheduler's event loop callbacks:
//!
//! ```text
//!   Backend (present / frame-tick notifications)
//!       │
//!       ▼
//!   PresentEvent ──► PresentScheduler::on_present ──► Renderer::render_monitor
//!                        │                                │
//!                        │ arm vblank timer               └─► FenceHandle
//!                        ▼
//!                    TimerHost ··· fires ···► on_vblank_timer
//!                                                  │ fence unsignaled
//!                                                  ▼
//!                                     fence poll / gpu_done ──► catch-up render
//! ```
//!
//! **[`scheduler`]** — The [`PresentScheduler`](scheduler::PresentScheduler):
//! registration, the present algorithm, the delayed-frame machinery, and the
//! legacy tick path.
//!
//! **[`policy`]** — Capability-graded pacing policy, selected once per
//! output at registration (fenced vs. legacy), plus tunable intervals.
//!
//! **[`monitor`]** — Monitor identity and scheduler-visible state: damage
//! ring, tearing sub-state, backend capabilities.
//!
//! **[`vblank`]** — Deadline prediction from present timestamps and
//! margin-adjusted timer delays.
//!
//! **[`timer`] / [`render`] / [`session`]** — Collaborator contracts the
//! host implements; [`host`] bundles their borrows per dispatch.
//!
//! **[`fence`]** — Fence handles and the scoped slot that releases them on
//! every exit path.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! scheduling diagnostics, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Concurrency model
//!
//! Single-threaded, cooperative, event-loop-driven: every entry point runs
//! as a callback to completion, so no locking exists. The one genuine
//! concurrent actor is the GPU, observable only through fences — which is
//! exactly what the vblank/fence-poll timer pair bounds.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod fence;
pub mod host;
pub mod monitor;
pub mod policy;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod time;
pub mod timer;
pub mod timing;
pub mod trace;
pub mod vblank;
