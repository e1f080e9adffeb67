// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monitor identity and the scheduler-visible monitor state.
//!
//! [`MonitorId`] is the stable handle the scheduler keys its bookkeeping by;
//! the compositor assigns one per output and never reuses it while the
//! output lives. [`MonitorState`] is the face of a monitor the scheduler
//! reads and (for tearing bookkeeping) mutates: enablement, nominal refresh,
//! the damage ring, tearing sub-state, and backend capabilities. The
//! compositor owns the state and passes it `&mut` into scheduler entry
//! points.

use core::fmt;

use crate::policy::BackendCaps;
use crate::time::Duration;

/// Identifies a registered monitor (display output).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MonitorId(pub u32);

impl fmt::Debug for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MonitorId({})", self.0)
    }
}

/// An opaque handle to a client connection.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub u64);

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.0)
    }
}

/// An opaque handle to a backend-managed buffer.
///
/// Buffers are assigned by backends and passed through without
/// interpretation; the scheduler borrows them for completion-callback
/// routing, never owns them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u64);

impl fmt::Debug for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferId({})", self.0)
    }
}

/// Tearing sub-state for one monitor.
///
/// Owned by the monitor; the scheduler's render step clears `busy` and
/// consumes `frame_scheduled_while_busy` when issuing a torn present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TearingState {
    /// A fullscreen client has tearing presentation active on this output.
    pub actively_tearing: bool,
    /// A tearing page-flip is currently in the pipeline.
    pub busy: bool,
    /// A frame was scheduled while the pipeline was busy and still awaits
    /// display.
    pub frame_scheduled_while_busy: bool,
    /// The next render should be presented immediately, without waiting for
    /// vblank.
    pub next_render_torn: bool,
}

/// Per-monitor damage summary: the current frame plus a bounded ring of
/// previous frames.
///
/// The scheduler only asks one question of damage — "is there anything to
/// draw, here or in the recent past?" — so this tracks emptiness flags, not
/// regions. Region bookkeeping lives with the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageRing {
    current: bool,
    previous: [bool; Self::PREVIOUS_LEN],
}

impl DamageRing {
    /// Number of previous frames whose damage is remembered.
    pub const PREVIOUS_LEN: usize = 2;

    /// Creates an empty ring.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: false,
            previous: [false; Self::PREVIOUS_LEN],
        }
    }

    /// Records non-empty damage for the current frame.
    pub const fn mark(&mut self) {
        self.current = true;
    }

    /// Rotates the ring: the current frame's damage becomes the newest
    /// previous entry and the current flag clears. Called when a render
    /// consumes the damage.
    pub const fn rotate(&mut self) {
        let mut i = Self::PREVIOUS_LEN - 1;
        while i > 0 {
            self.previous[i] = self.previous[i - 1];
            i -= 1;
        }
        self.previous[0] = self.current;
        self.current = false;
    }

    /// Returns `true` if the current frame or any remembered previous frame
    /// has damage.
    #[must_use]
    pub const fn has_recent(&self) -> bool {
        if self.current {
            return true;
        }
        let mut i = 0;
        while i < Self::PREVIOUS_LEN {
            if self.previous[i] {
                return true;
            }
            i += 1;
        }
        false
    }

    /// Returns `true` if the current frame has damage.
    #[must_use]
    pub const fn has_current(&self) -> bool {
        self.current
    }
}

/// The scheduler-visible state of one monitor.
#[derive(Clone, Debug)]
pub struct MonitorState {
    /// Stable identity, assigned by the compositor.
    pub id: MonitorId,
    /// Whether the output is enabled. Disabled outputs are never rendered.
    pub enabled: bool,
    /// Nominal refresh interval, used when a present event carries no
    /// refresh hint.
    pub refresh_interval: Duration,
    /// Compositor-requested full redraws still owed on this output, in
    /// addition to the scheduler's own force counter.
    pub force_full_frames: u32,
    /// Tearing sub-state.
    pub tearing: TearingState,
    /// The single fullscreen client eligible for direct scanout, if any.
    pub solitary_client: Option<ClientId>,
    /// Damage summary for the skip decision.
    pub damage: DamageRing,
    /// What the backend can report for this output.
    pub caps: BackendCaps,
}

impl MonitorState {
    /// Creates an enabled monitor with a 60 Hz nominal refresh interval and
    /// no damage.
    #[must_use]
    pub const fn new(id: MonitorId, caps: BackendCaps) -> Self {
        Self {
            id,
            enabled: true,
            refresh_interval: Duration(16_666_667),
            force_full_frames: 0,
            tearing: TearingState {
                actively_tearing: false,
                busy: false,
                frame_scheduled_while_busy: false,
                next_render_torn: false,
            },
            solitary_client: None,
            damage: DamageRing::new(),
            caps,
        }
    }
}
