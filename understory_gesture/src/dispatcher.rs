// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher: execute a dispatch sequence against the host context.
//!
//! Routing operations on [`InputRouter`] never call handlers. They return a
//! sequence of [`Dispatch`] entries, each a snapshot of one handler taken at
//! routing time. [`run`] then invokes them in order with the host context.
//!
//! ## Semantics
//!
//! - Entries run in sequence order.
//! - Before each entry, [`run`] checks that the element still holds the same
//!   registration it had when the snapshot was taken. An entry whose element was
//!   unregistered (or unregistered and registered again) by an earlier handler is
//!   skipped, so a gesture never reaches an identity that is not registered.
//! - Handlers may freely mutate the router through the context, including
//!   unregistering their own element.
//!
//! ## Minimal example
//!
//! ```
//! use understory_gesture::dispatcher;
//! use understory_gesture::router::InputRouter;
//!
//! struct App {
//!     router: InputRouter<u32, App>,
//!     taps: u32,
//! }
//!
//! let mut app = App { router: InputRouter::new(), taps: 0 };
//! app.router.register_tap(1, |app: &mut App| app.taps += 1).unwrap();
//! app.router.set_active(Some(1));
//!
//! let seq = app.router.tap();
//! let ran = dispatcher::run(&seq, &mut app, |app| &app.router);
//! assert_eq!((ran, app.taps), (1, 1));
//! ```

use crate::handlers::Callback;
use crate::registry::Stamp;
use crate::router::InputRouter;
use crate::types::Gesture;

/// One handler invocation produced by routing.
pub struct Dispatch<K, C> {
    /// The gesture being delivered.
    pub gesture: Gesture,
    /// The element the handler is registered for.
    pub element: K,
    /// Registration the handler was taken from.
    pub stamp: Stamp,
    /// The handler.
    pub callback: Callback<C>,
}

impl<K: Clone, C> Clone for Dispatch<K, C> {
    fn clone(&self) -> Self {
        Self {
            gesture: self.gesture,
            element: self.element.clone(),
            stamp: self.stamp,
            callback: self.callback.clone(),
        }
    }
}

impl<K: core::fmt::Debug, C> core::fmt::Debug for Dispatch<K, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatch")
            .field("gesture", &self.gesture)
            .field("element", &self.element)
            .field("stamp", &self.stamp)
            .finish_non_exhaustive()
    }
}

/// Run a dispatch sequence and return how many handlers were invoked.
///
/// `router_of` projects the router out of the context so each entry can be
/// checked against the live registries right before it runs.
pub fn run<K, C>(
    seq: &[Dispatch<K, C>],
    ctx: &mut C,
    router_of: impl Fn(&C) -> &InputRouter<K, C>,
) -> usize
where
    K: Copy + Eq + core::hash::Hash + core::fmt::Debug,
{
    let mut invoked = 0;
    for d in seq {
        if router_of(ctx).stamp(d.gesture.kind(), &d.element) != Some(d.stamp) {
            tracing::trace!(element = ?d.element, gesture = ?d.gesture, "skipped stale dispatch");
            continue;
        }
        (d.callback)(ctx);
        invoked += 1;
    }
    invoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    struct Ctx {
        router: InputRouter<u32, Ctx>,
        log: Vec<u32>,
    }

    fn ctx() -> Ctx {
        Ctx {
            router: InputRouter::new(),
            log: Vec::new(),
        }
    }

    #[test]
    fn runs_entries_in_order() {
        let mut c = ctx();
        for k in [3, 1, 2] {
            c.router
                .register_back(k, move |c: &mut Ctx| c.log.push(k))
                .unwrap();
        }
        let seq = c.router.back();
        assert_eq!(run(&seq, &mut c, |c| &c.router), 3);
        assert_eq!(c.log, [3, 1, 2]);
    }

    #[test]
    fn handler_unregistering_a_later_entry_suppresses_it() {
        let mut c = ctx();
        c.router
            .register_back(1, |c: &mut Ctx| {
                c.log.push(1);
                c.router.unregister_back(&2);
            })
            .unwrap();
        c.router
            .register_back(2, |c: &mut Ctx| c.log.push(2))
            .unwrap();
        let seq = c.router.back();
        assert_eq!(run(&seq, &mut c, |c| &c.router), 1);
        assert_eq!(c.log, [1]);
    }

    #[test]
    fn handler_may_unregister_itself() {
        let mut c = ctx();
        c.router
            .register_back(1, |c: &mut Ctx| {
                c.router.unregister_back(&1);
                c.log.push(1);
            })
            .unwrap();
        c.router
            .register_back(2, |c: &mut Ctx| c.log.push(2))
            .unwrap();
        let seq = c.router.back();
        assert_eq!(run(&seq, &mut c, |c| &c.router), 2);
        assert_eq!(c.log, [1, 2]);
        assert!(c.router.back().len() == 1);
    }

    #[test]
    fn reregistered_element_does_not_receive_stale_snapshot() {
        let mut c = ctx();
        c.router
            .register_back(1, |c: &mut Ctx| {
                c.router.unregister_back(&1);
                c.router.unregister_back(&2);
                c.router
                    .register_back(2, |c: &mut Ctx| c.log.push(200))
                    .unwrap();
            })
            .unwrap();
        c.router
            .register_back(2, |c: &mut Ctx| c.log.push(2))
            .unwrap();
        let seq = c.router.back();
        run(&seq, &mut c, |c| &c.router);
        assert!(c.log.is_empty());

        // The replacement is live for the next gesture.
        let seq = c.router.back();
        run(&seq, &mut c, |c| &c.router);
        assert_eq!(c.log, [200]);
    }
}
