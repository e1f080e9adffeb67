// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor session state.
//!
//! Rendering is only safe while the compositor holds the active session
//! (not VT-switched away) and is not in the unsafe no-real-output state. The
//! scheduler consults this read-only before every render and uses the
//! recovery hook opportunistically when a real output reappears.

/// A snapshot of compositor-wide session flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The compositor currently holds the active session.
    pub active: bool,
    /// The compositor is running against a placeholder output only.
    pub unsafe_state: bool,
}

/// Read access to session flags plus the unsafe-state recovery hook.
pub trait Session {
    /// Returns the current session flags.
    fn state(&self) -> SessionState;

    /// Returns `true` if at least one real output besides the placeholder
    /// exists, making unsafe-state recovery possible.
    fn has_real_output(&self) -> bool;

    /// Attempts to leave the unsafe no-real-output state.
    fn leave_unsafe_state(&mut self);
}
