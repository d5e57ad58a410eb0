// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Frame: per-tick deferred work for a single owning loop.
//!
//! ## Overview
//!
//! A host loop runs in discrete ticks, and each tick has up to three phases
//! ([`TickPhase::PrePhysics`], [`TickPhase::Physics`], [`TickPhase::PostRender`]).
//! [`FrameScheduler`] keeps one queue per phase. Any thread may enqueue work; only
//! the owning loop calls [`FrameScheduler::run`], which executes everything that
//! was queued for that phase before the call started.
//!
//! Work enqueued while a phase is running lands in the next run of that phase.
//! This keeps a single tick bounded even when callbacks schedule more callbacks.
//!
//! ## Suspended work
//!
//! Besides one-shot actions, the scheduler accepts [`Task`]s: explicit suspended
//! continuations resumed once per run of their phase until they report
//! [`Step::Done`]. A task that needs "wait one tick, then continue" yields.
//!
//! ## Periodic work
//!
//! [`Ticker`] fires registered actions at fixed periods of accumulated tick time
//! and marshals each firing into a scheduler phase, so periodic actions always
//! execute on the owning loop.
//!
//! ```
//! use understory_frame::{FrameScheduler, TickPhase};
//!
//! let scheduler: FrameScheduler<Vec<u32>> = FrameScheduler::new();
//! let remote = scheduler.clone();
//! std::thread::spawn(move || remote.enqueue(TickPhase::PostRender, |log| log.push(7)))
//!     .join()
//!     .unwrap();
//!
//! let mut log = Vec::new();
//! assert_eq!(scheduler.run(TickPhase::PostRender, &mut log), 1);
//! assert_eq!(log, vec![7]);
//! ```

mod scheduler;
mod ticker;

pub use scheduler::{Action, FrameScheduler, Step, Task, TickPhase};
pub use ticker::{TickableId, Ticker};
