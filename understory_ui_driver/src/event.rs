// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input events delivered to the driver.

use kurbo::{Point, Vec2};
use understory_gesture::types::InputMode;

/// Which kind of device is driving the UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ControlScheme {
    /// Mouse, pen or touch.
    Pointer,
    /// Gamepad or other directional controller.
    Gamepad,
}

impl ControlScheme {
    /// The addressing mode this scheme implies.
    ///
    /// Pointer devices target by hit testing; directional devices move the
    /// active object explicitly.
    pub fn mode(self) -> InputMode {
        match self {
            Self::Pointer => InputMode::Targeted,
            Self::Gamepad => InputMode::Direct,
        }
    }
}

/// One discrete input event, edge-triggered.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// The pointer moved to a screen position.
    PointerMoved(Point),
    /// Primary press.
    Tap,
    /// Alternate press.
    AltTap,
    /// Back press.
    Back,
    /// Hold button toggled; the first toggle presses, the next releases.
    Hold,
    /// Scroll with a signed delta.
    Scroll(f64),
    /// Directional navigation.
    Navigate(Vec2),
    /// The active control scheme changed.
    ControlsChanged(ControlScheme),
}
