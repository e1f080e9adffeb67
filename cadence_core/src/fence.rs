// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU completion fences.
//!
//! A [`FenceHandle`] names a GPU synchronization object minted by the
//! renderer for one render. The scheduler holds at most one per monitor, in
//! a [`FenceSlot`]: a scoped holder whose `replace`/`clear` release the
//! outgoing fence through the renderer on every path — including
//! reassignment — so a handle can never leak across present cycles.

use core::fmt;

use crate::render::Renderer;

/// An opaque handle to a GPU completion fence.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FenceHandle(pub u64);

impl fmt::Debug for FenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FenceHandle({})", self.0)
    }
}

/// Holds at most one fence and releases the previous one on every store.
#[derive(Debug, Default)]
pub struct FenceSlot {
    handle: Option<FenceHandle>,
}

impl FenceSlot {
    /// Creates an empty slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self { handle: None }
    }

    /// Returns the held fence, if any.
    #[must_use]
    pub const fn handle(&self) -> Option<FenceHandle> {
        self.handle
    }

    /// Stores `next`, releasing any previously held fence first.
    pub fn replace(&mut self, renderer: &mut dyn Renderer, next: Option<FenceHandle>) {
        if let Some(old) = self.handle.take() {
            renderer.release_fence(old);
        }
        self.handle = next;
    }

    /// Releases any held fence and leaves the slot empty.
    pub fn clear(&mut self, renderer: &mut dyn Renderer) {
        self.replace(renderer, None);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::monitor::MonitorState;

    #[derive(Default)]
    struct ReleaseLog {
        released: Vec<FenceHandle>,
    }

    impl Renderer for ReleaseLog {
        fn render_monitor(
            &mut self,
            _monitor: &mut MonitorState,
            _want_fence: bool,
        ) -> Option<FenceHandle> {
            None
        }

        fn recheck_solitary(&mut self, _monitor: &mut MonitorState) {}

        fn fence_signaled(&mut self, _fence: FenceHandle) -> bool {
            false
        }

        fn release_fence(&mut self, fence: FenceHandle) {
            self.released.push(fence);
        }
    }

    #[test]
    fn replace_releases_previous_fence() {
        let mut log = ReleaseLog::default();
        let mut slot = FenceSlot::empty();

        slot.replace(&mut log, Some(FenceHandle(1)));
        assert!(log.released.is_empty());

        slot.replace(&mut log, Some(FenceHandle(2)));
        assert_eq!(log.released, [FenceHandle(1)]);
        assert_eq!(slot.handle(), Some(FenceHandle(2)));
    }

    #[test]
    fn clear_releases_and_empties() {
        let mut log = ReleaseLog::default();
        let mut slot = FenceSlot::empty();

        slot.replace(&mut log, Some(FenceHandle(7)));
        slot.clear(&mut log);
        assert_eq!(log.released, [FenceHandle(7)]);
        assert_eq!(slot.handle(), None);

        // Clearing an empty slot releases nothing.
        slot.clear(&mut log);
        assert_eq!(log.released.len(), 1);
    }
}
