// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Controller: a tree of stateful controllers that own views.
//!
//! ## Overview
//!
//! A controller owns exactly one visual element (a [`View`](view::View)) and,
//! optionally, a value-type model that a [`ModelView`](view::ModelView) renders.
//! Controllers form a forest in a [`ControllerTree`](tree::ControllerTree) arena:
//!
//! - Construction adopts an existing view or instantiates one from a
//!   [`Template`](view::Template) under a scope, and applies the initial model
//!   immediately.
//! - `add_child` is idempotent and `remove_child` is a plain set removal.
//! - `close` is the only way a controller ends. It closes owned children first,
//!   bottom-up, then for each controller detaches it from its parent, removes
//!   its element from the gesture registries through
//!   [`Registrations`](understory_gesture::router::Registrations), and destroys
//!   the view.
//! - Model changes are batched: any number of requests in one tick produce one
//!   view write when the host flushes at the end of the tick.
//!
//! Activity markers model modal scoping: a controller is active UI if it or
//! any ancestor holds one.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod error;
pub mod tree;
pub mod types;
pub mod view;
