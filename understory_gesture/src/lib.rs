// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Gesture: identity-keyed gesture routing for interactive elements.
//!
//! ## Overview
//!
//! Elements take part in gestures by registering handlers, not by implementing a
//! trait: any element may hold any subset of tap, alternate tap, back, scroll,
//! focus and hold registrations. Each kind has its own
//! [`GestureRegistry`](registry::GestureRegistry) keyed by element identity.
//!
//! [`InputRouter`](router::InputRouter) owns the registries together with the
//! routing state and turns raw input into gestures:
//!
//! 1) Hit resolution. On pointer movement the router asks an opaque
//!    [`HitTest`](resolve::HitTest) backend for candidates under the pointer, and
//!    [`HitResolver`](resolve::HitResolver) picks one by
//!    [`Priority`](types::Priority), keeping the frontmost on ties.
//! 2) Active object. The winner becomes the active object, producing focus
//!    exit/enter transitions. While a hold is in progress the active object is
//!    frozen.
//! 3) Addressing. Targeted gestures go to the active object; in
//!    [`InputMode::Global`](types::InputMode::Global) they go to every registered
//!    element. Back is always a broadcast.
//! 4) Holds. [`HoldMachine`](hold::HoldMachine) accumulates tick time across a
//!    press and fires start, frame and release.
//!
//! ## Dispatch
//!
//! Routing never calls handlers. It returns a snapshot sequence of
//! [`Dispatch`](dispatcher::Dispatch) entries, and [`dispatcher::run`] executes it
//! against the host context `C`. Handlers therefore receive `&mut C` with no
//! borrow of the router held, and may register or unregister anything,
//! including themselves. Entries whose registration was removed in the
//! meantime are skipped.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_gesture::dispatcher;
//! use understory_gesture::router::InputRouter;
//! use understory_gesture::stack::HitStack;
//! use understory_gesture::types::Priority;
//!
//! struct App {
//!     router: InputRouter<u32, App>,
//!     tapped: Vec<u32>,
//! }
//!
//! let mut stack = HitStack::new();
//! stack.push_back(1, Rect::new(0.0, 0.0, 50.0, 50.0), Priority::Default);
//! stack.push_back(2, Rect::new(0.0, 0.0, 50.0, 50.0), Priority::High);
//!
//! let mut app = App { router: InputRouter::new(), tapped: Vec::new() };
//! for id in [1, 2] {
//!     app.router.register_tap(id, move |app: &mut App| app.tapped.push(id)).unwrap();
//! }
//!
//! let seq = app.router.pointer_moved(&stack, Point::new(10.0, 10.0));
//! dispatcher::run(&seq, &mut app, |app| &app.router);
//! let seq = app.router.tap();
//! dispatcher::run(&seq, &mut app, |app| &app.router);
//! assert_eq!(app.tapped, [2]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod hold;
pub mod registry;
pub mod resolve;
pub mod router;
pub mod stack;
pub mod types;
