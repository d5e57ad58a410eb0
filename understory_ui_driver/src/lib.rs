// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory UI Driver: raw input in, gestures and view updates out.
//!
//! ## Overview
//!
//! [`UiDriver`](driver::UiDriver) ties the Understory input pieces into one
//! owner that a host loop feeds:
//!
//! - [`InputEvent`](event::InputEvent)s go through
//!   [`UiDriver::handle`](driver::UiDriver::handle), which routes them with the
//!   gesture router and runs the resulting handlers.
//! - Each host tick calls [`UiDriver::frame`](driver::UiDriver::frame) (or the
//!   three phase calls separately). Holds advance, queued work runs, and the
//!   controller tree writes batched model changes into views at the end.
//! - Handlers receive `&mut UiDriver`, so the application state, the
//!   controller tree and the registries are all reachable from a callback.
//!
//! Configuration comes from [`DriverConfig`](config::DriverConfig), usually
//! parsed from TOML.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_gesture::stack::HitStack;
//! use understory_gesture::types::Priority;
//! use understory_ui_driver::config::DriverConfig;
//! use understory_ui_driver::driver::UiDriver;
//! use understory_ui_driver::element::ElementId;
//! use understory_ui_driver::event::InputEvent;
//!
//! let config = DriverConfig::from_toml_str("hold_threshold_secs = 0.2").unwrap();
//! let mut driver = UiDriver::new(0_u32, HitStack::<ElementId>::new(), &config).unwrap();
//!
//! let button = driver.next_element();
//! driver
//!     .scene_mut()
//!     .push_back(button, Rect::new(0.0, 0.0, 40.0, 20.0), Priority::Default);
//! driver
//!     .router_mut()
//!     .register_tap(button, |d: &mut UiDriver<u32, HitStack<ElementId>>| *d.state_mut() += 1)
//!     .unwrap();
//!
//! driver.handle(InputEvent::PointerMoved(Point::new(5.0, 5.0)));
//! driver.handle(InputEvent::Tap);
//! assert_eq!(*driver.state(), 1);
//! ```

pub mod config;
pub mod driver;
pub mod element;
pub mod error;
pub mod event;
