// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: priorities, addressing modes, gesture kinds, and hit candidates.

use smallvec::SmallVec;

/// Interaction priority of an element. Higher ranks win hit resolution.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    /// Loses to everything else.
    VeryLow,
    /// Below default.
    Low,
    /// The rank of an element that does not ask for anything special.
    #[default]
    Default,
    /// Above default.
    High,
    /// Wins against everything else.
    VeryHigh,
}

/// Policy for which elements receive an addressed gesture.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InputMode {
    /// The active object follows the pointer via hit resolution.
    #[default]
    Targeted,
    /// The active object is only set explicitly (for example by directional navigation).
    Direct,
    /// Every registered element receives the gesture; the active object is ignored.
    Global,
}

impl InputMode {
    /// Returns true if pointer movement retargets the active object.
    pub fn follows_pointer(self) -> bool {
        matches!(self, Self::Targeted)
    }
}

bitflags::bitflags! {
    /// Set of gesture registries.
    ///
    /// Used to report which registries an element was removed from and to name
    /// the registry a duplicate registration was rejected by.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct GestureKinds: u8 {
        /// Primary tap.
        const TAP     = 0b0000_0001;
        /// Alternate (secondary) tap.
        const ALT_TAP = 0b0000_0010;
        /// System-wide back.
        const BACK    = 0b0000_0100;
        /// Scroll up/down.
        const SCROLL  = 0b0000_1000;
        /// Focus enter/exit.
        const FOCUS   = 0b0001_0000;
        /// Press-and-hold.
        const HOLD    = 0b0010_0000;
    }
}

/// A concrete gesture delivered to a handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Primary tap.
    Tap,
    /// Alternate tap.
    AltTap,
    /// Back.
    Back,
    /// Scroll with a positive delta.
    ScrollUp,
    /// Scroll with a negative delta.
    ScrollDown,
    /// The element became the active object.
    FocusEnter,
    /// The element stopped being the active object.
    FocusExit,
    /// A hold crossed its threshold.
    HoldStart,
    /// A tick passed while a started hold stays pressed.
    HoldFrame,
    /// The hold was released.
    HoldRelease,
}

impl Gesture {
    /// The registry this gesture is dispatched from.
    pub fn kind(self) -> GestureKinds {
        match self {
            Self::Tap => GestureKinds::TAP,
            Self::AltTap => GestureKinds::ALT_TAP,
            Self::Back => GestureKinds::BACK,
            Self::ScrollUp | Self::ScrollDown => GestureKinds::SCROLL,
            Self::FocusEnter | Self::FocusExit => GestureKinds::FOCUS,
            Self::HoldStart | Self::HoldFrame | Self::HoldRelease => GestureKinds::HOLD,
        }
    }
}

/// One element under the pointer, as reported by a hit-test backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Candidate<K> {
    /// Element identity.
    pub element: K,
    /// Interaction priority of the element.
    pub priority: Priority,
}

impl<K> Candidate<K> {
    /// Create a candidate.
    pub fn new(element: K, priority: Priority) -> Self {
        Self { element, priority }
    }
}

/// Candidate buffer filled by [`HitTest`](crate::resolve::HitTest) backends, front to back.
pub type Candidates<K> = SmallVec<[Candidate<K>; 8]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_low_to_high() {
        assert!(Priority::VeryLow < Priority::Low);
        assert!(Priority::Low < Priority::Default);
        assert!(Priority::Default < Priority::High);
        assert!(Priority::High < Priority::VeryHigh);
        assert_eq!(Priority::default(), Priority::Default);
    }

    #[test]
    fn every_gesture_maps_to_one_registry() {
        let all = [
            Gesture::Tap,
            Gesture::AltTap,
            Gesture::Back,
            Gesture::ScrollUp,
            Gesture::ScrollDown,
            Gesture::FocusEnter,
            Gesture::FocusExit,
            Gesture::HoldStart,
            Gesture::HoldFrame,
            Gesture::HoldRelease,
        ];
        for g in all {
            assert_eq!(g.kind().bits().count_ones(), 1, "{g:?} maps to one kind");
        }
        assert_eq!(Gesture::ScrollDown.kind(), GestureKinds::SCROLL);
        assert_eq!(Gesture::HoldRelease.kind(), GestureKinds::HOLD);
    }

    #[test]
    fn only_targeted_mode_follows_pointer() {
        assert!(InputMode::Targeted.follows_pointer());
        assert!(!InputMode::Direct.follows_pointer());
        assert!(!InputMode::Global.follows_pointer());
    }
}
