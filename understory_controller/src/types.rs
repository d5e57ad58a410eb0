// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifier and per-node flags.

/// Identifier for a controller in the tree (slot, generation).
///
/// A `ControllerId` becomes stale once its controller is closed. The slot may
/// be reused later with a higher generation, so stale ids never alias a newer
/// controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub(crate) u32, pub(crate) u32);

impl ControllerId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-controller state bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ControllerFlags: u8 {
        /// The view is shown.
        const VISIBLE  = 0b0000_0001;
        /// The controller holds its own activity marker.
        const ACTIVITY = 0b0000_0010;
        /// A refresh is queued and not yet applied.
        const DIRTY    = 0b0000_0100;
    }
}

impl Default for ControllerFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}
