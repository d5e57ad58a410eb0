// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router: owns the routing state and turns input into dispatch sequences.
//!
//! ## State
//!
//! [`InputRouter`] is the one owner of what would otherwise be process-wide
//! state: the per-kind registries, the [`InputMode`], the active object, the
//! last pointer position, and the hold machine. Hosts that need several
//! independent input surfaces (or tests) simply build several routers.
//!
//! ## Addressing
//!
//! - Tap, alt-tap, scroll and hold go to the active object's entry in
//!   [`InputMode::Targeted`] and [`InputMode::Direct`], and are dropped when
//!   there is no active object or it has no entry.
//! - In [`InputMode::Global`] they go to every entry of the registry.
//! - Back always goes to every entry of the back registry.
//! - Focus enter/exit are produced by active object changes only.
//!
//! Broadcasts are ordered by registration.
//!
//! ## Active object
//!
//! [`InputRouter::set_active`] emits the outgoing element's focus exit and then
//! the incoming element's focus enter. While a hold session is live, changes are
//! ignored so a drag never retargets mid-gesture.

use alloc::vec::Vec;
use core::hash::Hash;
use core::time::Duration;

use kurbo::{Point, Rect, Vec2};

use crate::dispatcher::Dispatch;
use crate::error::GestureError;
use crate::handlers::{Callback, FocusHandlers, HoldHandlers, ScrollHandlers, callback};
use crate::hold::{HoldMachine, HoldPhase, HoldSession};
use crate::registry::{GestureRegistry, Stamp};
use crate::resolve::{HitResolver, HitTest};
use crate::types::{Gesture, GestureKinds, InputMode};

/// Upper bound on probe steps for one navigation.
const MAX_PROBES: usize = 16_384;

/// Removal of every registration held by an element.
///
/// This is the seam a controller tree tears down through; [`InputRouter`]
/// implements it.
pub trait Registrations<K> {
    /// Remove `element` from every registry and return the kinds it was in.
    fn unregister_all(&mut self, element: &K) -> GestureKinds;
}

/// Routes input to handlers registered per element identity.
///
/// `K` is the element identity and `C` the host context handlers receive.
pub struct InputRouter<K, C> {
    tap: GestureRegistry<K, Callback<C>>,
    alt_tap: GestureRegistry<K, Callback<C>>,
    back: GestureRegistry<K, Callback<C>>,
    focus: GestureRegistry<K, FocusHandlers<C>>,
    scroll: GestureRegistry<K, ScrollHandlers<C>>,
    hold: GestureRegistry<K, HoldHandlers<C>>,
    mode: InputMode,
    active: Option<K>,
    pointer: Point,
    // Where the last navigation found its winner; follows the pointer otherwise.
    cursor: Point,
    resolver: HitResolver<K>,
    holds: HoldMachine<K, C>,
    navigate_step: f64,
}

impl<K: core::fmt::Debug, C> core::fmt::Debug for InputRouter<K, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InputRouter")
            .field("mode", &self.mode)
            .field("active", &self.active)
            .field("pointer", &self.pointer)
            .field("cursor", &self.cursor)
            .field("holds", &self.holds)
            .field("navigate_step", &self.navigate_step)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + Hash + core::fmt::Debug, C> Default for InputRouter<K, C> {
    fn default() -> Self {
        Self::new()
    }
}

fn single<K, C>(
    gesture: Gesture,
    element: K,
    stamp: Stamp,
    callback: Option<&Callback<C>>,
) -> Option<Dispatch<K, C>> {
    callback.map(|cb| Dispatch {
        gesture,
        element,
        stamp,
        callback: cb.clone(),
    })
}

impl<K: Copy + Eq + Hash + core::fmt::Debug, C> InputRouter<K, C> {
    /// Create a router in [`InputMode::Targeted`] with empty registries.
    pub fn new() -> Self {
        Self {
            tap: GestureRegistry::new(GestureKinds::TAP),
            alt_tap: GestureRegistry::new(GestureKinds::ALT_TAP),
            back: GestureRegistry::new(GestureKinds::BACK),
            focus: GestureRegistry::new(GestureKinds::FOCUS),
            scroll: GestureRegistry::new(GestureKinds::SCROLL),
            hold: GestureRegistry::new(GestureKinds::HOLD),
            mode: InputMode::default(),
            active: None,
            pointer: Point::ZERO,
            cursor: Point::ZERO,
            resolver: HitResolver::new(),
            holds: HoldMachine::new(),
            navigate_step: 1.0,
        }
    }

    // --- registration -------------------------------------------------------

    /// Register a tap handler for `element`.
    pub fn register_tap(
        &mut self,
        element: K,
        f: impl Fn(&mut C) + 'static,
    ) -> Result<(), GestureError> {
        self.tap.insert(element, callback(f)).map(drop).inspect_err(warn_rejected)
    }

    /// Register an alternate-tap handler for `element`.
    pub fn register_alt_tap(
        &mut self,
        element: K,
        f: impl Fn(&mut C) + 'static,
    ) -> Result<(), GestureError> {
        self.alt_tap
            .insert(element, callback(f))
            .map(drop)
            .inspect_err(warn_rejected)
    }

    /// Register a back handler for `element`.
    pub fn register_back(
        &mut self,
        element: K,
        f: impl Fn(&mut C) + 'static,
    ) -> Result<(), GestureError> {
        self.back.insert(element, callback(f)).map(drop).inspect_err(warn_rejected)
    }

    /// Register focus enter/exit handlers for `element`.
    pub fn register_focus(
        &mut self,
        element: K,
        handlers: FocusHandlers<C>,
    ) -> Result<(), GestureError> {
        self.focus.insert(element, handlers).map(drop).inspect_err(warn_rejected)
    }

    /// Register scroll handlers for `element`.
    pub fn register_scroll(
        &mut self,
        element: K,
        handlers: ScrollHandlers<C>,
    ) -> Result<(), GestureError> {
        self.scroll.insert(element, handlers).map(drop).inspect_err(warn_rejected)
    }

    /// Register hold handlers for `element`.
    pub fn register_hold(
        &mut self,
        element: K,
        handlers: HoldHandlers<C>,
    ) -> Result<(), GestureError> {
        self.hold.insert(element, handlers).map(drop).inspect_err(warn_rejected)
    }

    /// Remove the tap handler of `element`. Returns false if there was none.
    pub fn unregister_tap(&mut self, element: &K) -> bool {
        self.tap.remove(element)
    }

    /// Remove the alternate-tap handler of `element`.
    pub fn unregister_alt_tap(&mut self, element: &K) -> bool {
        self.alt_tap.remove(element)
    }

    /// Remove the back handler of `element`.
    pub fn unregister_back(&mut self, element: &K) -> bool {
        self.back.remove(element)
    }

    /// Remove the focus handlers of `element`.
    pub fn unregister_focus(&mut self, element: &K) -> bool {
        self.focus.remove(element)
    }

    /// Remove the scroll handlers of `element`.
    pub fn unregister_scroll(&mut self, element: &K) -> bool {
        self.scroll.remove(element)
    }

    /// Remove the hold handlers of `element`.
    ///
    /// A live session keeps the element as a target, but its remaining
    /// callbacks are skipped at dispatch.
    pub fn unregister_hold(&mut self, element: &K) -> bool {
        self.hold.remove(element)
    }

    /// Current registration stamp of `element` in the registry for `kind`.
    ///
    /// `kind` must name exactly one registry; anything else yields `None`.
    pub fn stamp(&self, kind: GestureKinds, element: &K) -> Option<Stamp> {
        if kind == GestureKinds::TAP {
            self.tap.stamp(element)
        } else if kind == GestureKinds::ALT_TAP {
            self.alt_tap.stamp(element)
        } else if kind == GestureKinds::BACK {
            self.back.stamp(element)
        } else if kind == GestureKinds::FOCUS {
            self.focus.stamp(element)
        } else if kind == GestureKinds::SCROLL {
            self.scroll.stamp(element)
        } else if kind == GestureKinds::HOLD {
            self.hold.stamp(element)
        } else {
            None
        }
    }

    /// Registries `element` currently has an entry in.
    pub fn registrations_of(&self, element: &K) -> GestureKinds {
        let mut kinds = GestureKinds::empty();
        for kind in GestureKinds::all().iter() {
            if self.stamp(kind, element).is_some() {
                kinds |= kind;
            }
        }
        kinds
    }

    /// Returns true if `element` is registered for every kind in `kinds`.
    pub fn is_registered(&self, kinds: GestureKinds, element: &K) -> bool {
        self.registrations_of(element).contains(kinds)
    }

    // --- settings -----------------------------------------------------------

    /// Current addressing mode.
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Change the addressing mode. The active object is kept.
    ///
    /// A mode change moves the navigation cursor back to the pointer.
    pub fn set_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            tracing::debug!(from = ?self.mode, to = ?mode, "input mode changed");
            self.mode = mode;
            self.cursor = self.pointer;
        }
    }

    /// Restrict hit resolution to elements accepted by `scope`.
    pub fn set_scope(&mut self, scope: Option<fn(&K) -> bool>) {
        self.resolver.set_scope(scope);
    }

    /// The resolver used for pointer and navigation hits.
    pub fn resolver(&self) -> &HitResolver<K> {
        &self.resolver
    }

    /// Distance between navigation probes.
    pub fn navigate_step(&self) -> f64 {
        self.navigate_step
    }

    /// Set the distance between navigation probes.
    ///
    /// Non-positive or non-finite steps are ignored.
    pub fn set_navigate_step(&mut self, step: f64) {
        if step.is_finite() && step > 0.0 {
            self.navigate_step = step;
        } else {
            tracing::warn!(step, "ignored invalid navigation step");
        }
    }

    /// Last pointer position reported through [`Self::pointer_moved`].
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Start point of the next navigation probe.
    pub fn navigation_cursor(&self) -> Point {
        self.cursor
    }

    // --- active object ------------------------------------------------------

    /// The current active object.
    pub fn active(&self) -> Option<K> {
        self.active
    }

    /// Phase of the hold machine.
    pub fn hold_phase(&self) -> HoldPhase {
        self.holds.phase()
    }

    /// Returns true while a hold session freezes the active object.
    pub fn is_holding(&self) -> bool {
        self.holds.is_live()
    }

    /// Make `next` the active object.
    ///
    /// Returns the focus exit of the old element followed by the focus enter of
    /// the new one. Setting the current value, or any value while a hold
    /// session is live, returns nothing and changes nothing.
    pub fn set_active(&mut self, next: Option<K>) -> Vec<Dispatch<K, C>> {
        let mut out = Vec::new();
        if self.active == next {
            return out;
        }
        if self.holds.is_live() {
            tracing::trace!(current = ?self.active, ignored = ?next, "active object frozen by hold");
            return out;
        }
        let prev = core::mem::replace(&mut self.active, next);
        tracing::debug!(from = ?prev, to = ?next, "active object changed");
        if let Some(prev) = prev
            && let Some((stamp, h)) = self.focus.get(&prev)
        {
            out.extend(single(Gesture::FocusExit, prev, stamp, h.on_exit.as_ref()));
        }
        if let Some(next) = next
            && let Some((stamp, h)) = self.focus.get(&next)
        {
            out.extend(single(Gesture::FocusEnter, next, stamp, h.on_enter.as_ref()));
        }
        out
    }

    /// Record a pointer move and, in [`InputMode::Targeted`], retarget the
    /// active object to the winner under `at`.
    ///
    /// The navigation cursor moves to `at` in every mode.
    pub fn pointer_moved(&mut self, backend: &impl HitTest<K>, at: Point) -> Vec<Dispatch<K, C>> {
        self.pointer = at;
        self.cursor = at;
        if !self.mode.follows_pointer() {
            return Vec::new();
        }
        let winner = self.resolver.resolve_at(backend, at);
        self.set_active(winner)
    }

    /// Move the active object along `direction` in [`InputMode::Direct`].
    ///
    /// A probe starts at the navigation cursor and steps along the normalized
    /// direction until hit resolution finds an element other than the current
    /// active object, or the probe leaves `bounds` (edges inclusive). The
    /// cursor then rests where the winner was found, so repeated presses keep
    /// moving the same way. The pointer itself does not move. A zero
    /// direction, or any other mode, does nothing.
    pub fn navigate(
        &mut self,
        backend: &impl HitTest<K>,
        direction: Vec2,
        bounds: Rect,
    ) -> Vec<Dispatch<K, C>> {
        if self.mode != InputMode::Direct {
            return Vec::new();
        }
        let len = direction.hypot();
        if !(len.is_finite() && len > 0.0) {
            return Vec::new();
        }
        let step = direction * (self.navigate_step / len);
        let inside = |p: Point| {
            p.x >= bounds.x0 && p.x <= bounds.x1 && p.y >= bounds.y0 && p.y <= bounds.y1
        };
        let mut probe = self.cursor;
        let mut found = None;
        for _ in 0..MAX_PROBES {
            if found.is_some() || !inside(probe) {
                break;
            }
            probe += step;
            found = self
                .resolver
                .resolve_at(backend, probe)
                .filter(|hit| Some(*hit) != self.active);
        }
        tracing::trace!(?direction, ?found, "navigation probe finished");
        match found {
            Some(next) => {
                let out = self.set_active(Some(next));
                // A live hold refuses the change; the cursor stays with it.
                if self.active == Some(next) {
                    self.cursor = probe;
                }
                out
            }
            None => Vec::new(),
        }
    }

    // --- gestures -----------------------------------------------------------

    fn address<B: Clone>(
        &self,
        registry: &GestureRegistry<K, B>,
        gesture: Gesture,
        pick: impl Fn(&B) -> Option<&Callback<C>>,
    ) -> Vec<Dispatch<K, C>> {
        if self.mode == InputMode::Global {
            return broadcast(registry, gesture, pick);
        }
        let Some(active) = self.active else {
            tracing::trace!(?gesture, "dropped: no active object");
            return Vec::new();
        };
        registry
            .get(&active)
            .and_then(|(stamp, b)| single(gesture, active, stamp, pick(b)))
            .into_iter()
            .collect()
    }

    /// Primary tap.
    pub fn tap(&self) -> Vec<Dispatch<K, C>> {
        self.address(&self.tap, Gesture::Tap, |cb| Some(cb))
    }

    /// Alternate tap.
    pub fn alt_tap(&self) -> Vec<Dispatch<K, C>> {
        self.address(&self.alt_tap, Gesture::AltTap, |cb| Some(cb))
    }

    /// Back, broadcast to every back handler regardless of mode.
    pub fn back(&self) -> Vec<Dispatch<K, C>> {
        broadcast(&self.back, Gesture::Back, |cb| Some(cb))
    }

    /// One discrete scroll event.
    ///
    /// A positive `delta` scrolls up, a negative one down; zero (or NaN) does
    /// nothing. The magnitude is not used.
    pub fn scroll(&self, delta: f64) -> Vec<Dispatch<K, C>> {
        if delta > 0.0 {
            self.address(&self.scroll, Gesture::ScrollUp, |h| h.on_up.as_ref())
        } else if delta < 0.0 {
            self.address(&self.scroll, Gesture::ScrollDown, |h| h.on_down.as_ref())
        } else {
            Vec::new()
        }
    }

    /// Flip the hold press state.
    ///
    /// A press arms a session for the active object (or, in
    /// [`InputMode::Global`], every hold entry). A press with no active object
    /// outside global mode arms nothing. The next toggle is the release.
    pub fn toggle_hold(&mut self) -> Vec<Dispatch<K, C>> {
        let mode = self.mode;
        let active = self.active;
        let registry = &self.hold;
        self.holds.toggle(|| match mode {
            InputMode::Global => Some(HoldSession::new(registry.snapshot())),
            InputMode::Targeted | InputMode::Direct => active.map(|a| {
                HoldSession::new(registry.get(&a).map(|(stamp, h)| (a, stamp, h.clone())))
            }),
        })
    }

    /// Advance the hold session by one tick.
    pub fn advance(&mut self, dt: Duration) -> Vec<Dispatch<K, C>> {
        self.holds.advance(dt)
    }

    /// Remove `element` from every registry.
    ///
    /// If it is the active object the slot is cleared without focus callbacks,
    /// and it leaves a live hold session without a release. Used right before
    /// the element is destroyed.
    pub fn unregister_all(&mut self, element: &K) -> GestureKinds {
        let mut kinds = GestureKinds::empty();
        kinds.set(GestureKinds::TAP, self.tap.remove(element));
        kinds.set(GestureKinds::ALT_TAP, self.alt_tap.remove(element));
        kinds.set(GestureKinds::BACK, self.back.remove(element));
        kinds.set(GestureKinds::FOCUS, self.focus.remove(element));
        kinds.set(GestureKinds::SCROLL, self.scroll.remove(element));
        kinds.set(GestureKinds::HOLD, self.hold.remove(element));
        if self.active == Some(*element) {
            self.active = None;
        }
        self.holds.purge(element);
        tracing::debug!(?element, ?kinds, "unregistered element");
        kinds
    }
}

fn warn_rejected(err: &GestureError) {
    tracing::warn!(%err, "registration rejected");
}

fn broadcast<K, B, C>(
    registry: &GestureRegistry<K, B>,
    gesture: Gesture,
    pick: impl Fn(&B) -> Option<&Callback<C>>,
) -> Vec<Dispatch<K, C>>
where
    K: Copy + Eq + Hash,
    B: Clone,
{
    registry
        .snapshot()
        .iter()
        .filter_map(|(element, stamp, b)| single(gesture, *element, *stamp, pick(b)))
        .collect()
}

impl<K: Copy + Eq + Hash + core::fmt::Debug, C> Registrations<K> for InputRouter<K, C> {
    fn unregister_all(&mut self, element: &K) -> GestureKinds {
        Self::unregister_all(self, element)
    }
}
