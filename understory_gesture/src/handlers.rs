// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callback bundles stored in the gesture registries.
//!
//! Handlers receive the host context `C` mutably; they hold no borrow of the
//! router, so a handler may register, unregister, or retarget freely.

use alloc::rc::Rc;
use core::time::Duration;

/// A gesture handler.
pub type Callback<C> = Rc<dyn Fn(&mut C)>;

/// Wrap a closure as a [`Callback`].
pub fn callback<C>(f: impl Fn(&mut C) + 'static) -> Callback<C> {
    Rc::new(f)
}

/// Hold threshold used when none is given.
pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_millis(500);

/// Focus enter/exit handlers.
pub struct FocusHandlers<C> {
    /// Called when the element becomes the active object.
    pub on_enter: Option<Callback<C>>,
    /// Called when the element stops being the active object.
    pub on_exit: Option<Callback<C>>,
}

/// Scroll handlers; one fires per discrete scroll event.
pub struct ScrollHandlers<C> {
    /// Positive scroll delta.
    pub on_up: Option<Callback<C>>,
    /// Negative scroll delta.
    pub on_down: Option<Callback<C>>,
}

/// Press-and-hold handlers.
///
/// `on_start` fires once when the press has lasted `threshold`, `on_frame` on
/// every later tick while still pressed, and `on_release` on release whether or
/// not the threshold was reached.
pub struct HoldHandlers<C> {
    /// Threshold crossed.
    pub on_start: Option<Callback<C>>,
    /// Tick after the start while still pressed.
    pub on_frame: Option<Callback<C>>,
    /// Release.
    pub on_release: Option<Callback<C>>,
    /// Press duration before `on_start` fires.
    pub threshold: Duration,
}

// Manual impls: deriving would require `C: Clone` / `C: Default`.

impl<C> Clone for FocusHandlers<C> {
    fn clone(&self) -> Self {
        Self {
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
        }
    }
}

impl<C> Default for FocusHandlers<C> {
    fn default() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
        }
    }
}

impl<C> Clone for ScrollHandlers<C> {
    fn clone(&self) -> Self {
        Self {
            on_up: self.on_up.clone(),
            on_down: self.on_down.clone(),
        }
    }
}

impl<C> Default for ScrollHandlers<C> {
    fn default() -> Self {
        Self {
            on_up: None,
            on_down: None,
        }
    }
}

impl<C> Clone for HoldHandlers<C> {
    fn clone(&self) -> Self {
        Self {
            on_start: self.on_start.clone(),
            on_frame: self.on_frame.clone(),
            on_release: self.on_release.clone(),
            threshold: self.threshold,
        }
    }
}

impl<C> Default for HoldHandlers<C> {
    fn default() -> Self {
        Self {
            on_start: None,
            on_frame: None,
            on_release: None,
            threshold: DEFAULT_HOLD_THRESHOLD,
        }
    }
}

impl<C> core::fmt::Debug for FocusHandlers<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FocusHandlers")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

impl<C> core::fmt::Debug for ScrollHandlers<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollHandlers")
            .field("on_up", &self.on_up.is_some())
            .field("on_down", &self.on_down.is_some())
            .finish()
    }
}

impl<C> core::fmt::Debug for HoldHandlers<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HoldHandlers")
            .field("on_start", &self.on_start.is_some())
            .field("on_frame", &self.on_frame.is_some())
            .field("on_release", &self.on_release.is_some())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl<C> HoldHandlers<C> {
    /// Handlers with the given threshold and no callbacks.
    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Set the start callback.
    pub fn on_start(mut self, f: impl Fn(&mut C) + 'static) -> Self {
        self.on_start = Some(callback(f));
        self
    }

    /// Set the per-frame callback.
    pub fn on_frame(mut self, f: impl Fn(&mut C) + 'static) -> Self {
        self.on_frame = Some(callback(f));
        self
    }

    /// Set the release callback.
    pub fn on_release(mut self, f: impl Fn(&mut C) + 'static) -> Self {
        self.on_release = Some(callback(f));
        self
    }
}

impl<C> FocusHandlers<C> {
    /// Focus handlers from a pair of closures.
    pub fn new(on_enter: impl Fn(&mut C) + 'static, on_exit: impl Fn(&mut C) + 'static) -> Self {
        Self {
            on_enter: Some(callback(on_enter)),
            on_exit: Some(callback(on_exit)),
        }
    }
}

impl<C> ScrollHandlers<C> {
    /// Scroll handlers from a pair of closures.
    pub fn new(on_up: impl Fn(&mut C) + 'static, on_down: impl Fn(&mut C) + 'static) -> Self {
        Self {
            on_up: Some(callback(on_up)),
            on_down: Some(callback(on_down)),
        }
    }
}
