// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic actions marshalled onto the owning loop.

use core::time::Duration;
use std::sync::Arc;

use crate::scheduler::{FrameScheduler, TickPhase};

/// Upper bound on firings of one tickable per [`Ticker::advance`] call.
///
/// A stalled loop that resumes with a huge `dt` fires at most this many times
/// and drops the rest of the backlog.
const MAX_CATCH_UP: u32 = 16;

/// Handle returned by [`Ticker::add`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickableId(u64);

type Periodic<C> = Arc<dyn Fn(&mut C) + Send + Sync + 'static>;

struct Tickable<C> {
    id: TickableId,
    period: Duration,
    phase: TickPhase,
    accumulated: Duration,
    action: Periodic<C>,
}

/// Fires actions every `period` of accumulated tick time.
///
/// The ticker never calls an action itself: each firing is enqueued into the
/// [`FrameScheduler`] phase chosen at registration, so it executes wherever the
/// owning loop drains that phase.
pub struct Ticker<C> {
    scheduler: FrameScheduler<C>,
    next_id: u64,
    entries: Vec<Tickable<C>>,
}

impl<C> core::fmt::Debug for Ticker<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ticker")
            .field("tickables", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<C: 'static> Ticker<C> {
    /// Create a ticker feeding `scheduler`.
    pub fn new(scheduler: FrameScheduler<C>) -> Self {
        Self {
            scheduler,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Register `action` to fire every `period` into `phase`.
    ///
    /// A zero period fires once per [`Ticker::advance`].
    pub fn add(
        &mut self,
        period: Duration,
        phase: TickPhase,
        action: impl Fn(&mut C) + Send + Sync + 'static,
    ) -> TickableId {
        self.next_id += 1;
        let id = TickableId(self.next_id);
        self.entries.push(Tickable {
            id,
            period,
            phase,
            accumulated: Duration::ZERO,
            action: Arc::new(action),
        });
        id
    }

    /// Stop firing a tickable. Returns false if `id` was not registered.
    pub fn remove(&mut self, id: TickableId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|t| t.id != id);
        before != self.entries.len()
    }

    /// Number of registered tickables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Accumulate `dt` and enqueue every firing that became due.
    ///
    /// Returns the number of firings enqueued.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let mut fired = 0;
        for t in &mut self.entries {
            let due = if t.period.is_zero() {
                1
            } else {
                t.accumulated = t.accumulated.saturating_add(dt);
                let mut due = 0;
                while t.accumulated >= t.period && due < MAX_CATCH_UP {
                    t.accumulated -= t.period;
                    due += 1;
                }
                if due == MAX_CATCH_UP && t.accumulated >= t.period {
                    tracing::debug!(id = t.id.0, "ticker backlog dropped");
                    t.accumulated = Duration::ZERO;
                }
                due
            };
            for _ in 0..due {
                let action = Arc::clone(&t.action);
                self.scheduler.enqueue(t.phase, move |ctx| action(ctx));
            }
            fired += due as usize;
        }
        fired
    }
}
