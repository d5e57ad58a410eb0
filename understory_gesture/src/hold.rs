// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press-and-hold state machine.
//!
//! ## States
//!
//! `Idle → Armed → Firing → Idle`.
//!
//! - A press toggle while idle arms a [`HoldSession`] for the chosen targets.
//! - Every tick adds its `dt` to the session. When the accumulated time reaches a
//!   target's threshold, `on_start` fires once and the session is firing; on each
//!   later tick `on_frame` fires.
//! - The next press toggle releases: `on_release` fires for every target, whether
//!   or not its threshold was reached.
//!
//! Press toggles are a pure flip. A second toggle always releases the current
//! press, never starts another one. A press with nothing to target records the
//! flip without creating a session, so the matching release is silent.

use alloc::vec::Vec;
use core::time::Duration;

use smallvec::SmallVec;

use crate::dispatcher::Dispatch;
use crate::handlers::{Callback, HoldHandlers};
use crate::registry::Stamp;
use crate::types::Gesture;

/// Observable state of the machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoldPhase {
    /// No live session.
    Idle,
    /// A session is live and no target has reached its threshold.
    Armed,
    /// At least one target has fired its start.
    Firing,
}

struct HoldTarget<K, C> {
    element: K,
    stamp: Stamp,
    handlers: HoldHandlers<C>,
    started: bool,
}

/// State of one press, from press to release.
pub struct HoldSession<K, C> {
    elapsed: Duration,
    targets: SmallVec<[HoldTarget<K, C>; 1]>,
}

impl<K: Copy, C> HoldSession<K, C> {
    /// Arm a session for `targets`, each with the registration it came from.
    pub fn new(targets: impl IntoIterator<Item = (K, Stamp, HoldHandlers<C>)>) -> Self {
        Self {
            elapsed: Duration::ZERO,
            targets: targets
                .into_iter()
                .map(|(element, stamp, handlers)| HoldTarget {
                    element,
                    stamp,
                    handlers,
                    started: false,
                })
                .collect(),
        }
    }

    /// Time accumulated since the press.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns true once any target has crossed its threshold.
    pub fn started(&self) -> bool {
        self.targets.iter().any(|t| t.started)
    }

    /// Elements this session will deliver to.
    pub fn targets(&self) -> impl Iterator<Item = K> + '_ {
        self.targets.iter().map(|t| t.element)
    }
}

impl<K: core::fmt::Debug, C> core::fmt::Debug for HoldSession<K, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HoldSession")
            .field("elapsed", &self.elapsed)
            .field(
                "targets",
                &self.targets.iter().map(|t| &t.element).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The press flip flag plus the live session, if any.
pub struct HoldMachine<K, C> {
    pressed: bool,
    session: Option<HoldSession<K, C>>,
}

impl<K, C> Default for HoldMachine<K, C> {
    fn default() -> Self {
        Self {
            pressed: false,
            session: None,
        }
    }
}

impl<K: core::fmt::Debug, C> core::fmt::Debug for HoldMachine<K, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HoldMachine")
            .field("pressed", &self.pressed)
            .field("session", &self.session)
            .finish()
    }
}

fn push<K: Copy, C>(
    out: &mut Vec<Dispatch<K, C>>,
    gesture: Gesture,
    target: &HoldTarget<K, C>,
    callback: Option<&Callback<C>>,
) {
    if let Some(callback) = callback {
        out.push(Dispatch {
            gesture,
            element: target.element,
            stamp: target.stamp,
            callback: callback.clone(),
        });
    }
}

impl<K: Copy + Eq + core::fmt::Debug, C> HoldMachine<K, C> {
    /// Create an idle machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> HoldPhase {
        match &self.session {
            None => HoldPhase::Idle,
            Some(s) if s.started() => HoldPhase::Firing,
            Some(_) => HoldPhase::Armed,
        }
    }

    /// Returns true between a press toggle and its release toggle.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Returns true while a session is live.
    pub fn is_live(&self) -> bool {
        self.session.is_some()
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<&HoldSession<K, C>> {
        self.session.as_ref()
    }

    /// Flip the press state.
    ///
    /// On press, `arm` chooses the session (or `None` for a press without a
    /// target) and nothing is dispatched. On release, the session ends and its
    /// release handlers are returned.
    pub fn toggle(
        &mut self,
        arm: impl FnOnce() -> Option<HoldSession<K, C>>,
    ) -> Vec<Dispatch<K, C>> {
        self.pressed = !self.pressed;
        let mut out = Vec::new();
        if self.pressed {
            self.session = arm();
            tracing::debug!(session = ?self.session, "hold pressed");
        } else if let Some(session) = self.session.take() {
            tracing::debug!(elapsed = ?session.elapsed, started = session.started(), "hold released");
            for t in &session.targets {
                push(&mut out, Gesture::HoldRelease, t, t.handlers.on_release.as_ref());
            }
        }
        out
    }

    /// Advance the live session by one tick of length `dt`.
    pub fn advance(&mut self, dt: Duration) -> Vec<Dispatch<K, C>> {
        let mut out = Vec::new();
        let Some(session) = &mut self.session else {
            return out;
        };
        session.elapsed = session.elapsed.saturating_add(dt);
        let elapsed = session.elapsed;
        for t in &mut session.targets {
            if t.started {
                push(&mut out, Gesture::HoldFrame, t, t.handlers.on_frame.as_ref());
            } else if elapsed >= t.handlers.threshold {
                t.started = true;
                tracing::trace!(element = ?t.element, ?elapsed, "hold threshold crossed");
                push(&mut out, Gesture::HoldStart, t, t.handlers.on_start.as_ref());
            }
        }
        out
    }

    /// Drop `element` from the live session without a release.
    ///
    /// Used when the element is being destroyed mid-press. The press itself
    /// stays down so the next toggle is still its release.
    pub fn purge(&mut self, element: &K) -> bool {
        let Some(session) = &mut self.session else {
            return false;
        };
        let before = session.targets.len();
        session.targets.retain(|t| t.element != *element);
        before != session.targets.len()
    }
}
