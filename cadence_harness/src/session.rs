// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session double.

use cadence_core::session::{Session, SessionState};

/// A [`Session`] whose flags tests set directly.
#[derive(Debug)]
pub struct ScriptedSession {
    /// Current session flags, mutable from tests.
    pub state: SessionState,
    /// Whether a real output besides the placeholder exists.
    pub real_output: bool,
    recoveries: u32,
}

impl Default for ScriptedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSession {
    /// Creates an active, safe session with a real output.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SessionState {
                active: true,
                unsafe_state: false,
            },
            real_output: true,
            recoveries: 0,
        }
    }

    /// Number of `leave_unsafe_state` calls observed.
    #[must_use]
    pub const fn recoveries(&self) -> u32 {
        self.recoveries
    }
}

impl Session for ScriptedSession {
    fn state(&self) -> SessionState {
        self.state
    }

    fn has_real_output(&self) -> bool {
        self.real_output
    }

    fn leave_unsafe_state(&mut self) {
        self.state.unsafe_state = false;
        self.recoveries += 1;
    }
}
