// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit resolution: reduce backend candidates to a single winner.
//!
//! ## Ordering
//!
//! Backends report candidates front to back. A later candidate replaces the
//! current winner only if its [`Priority`](crate::types::Priority) is strictly
//! higher. Equal priorities therefore keep the frontmost candidate, and the
//! result is deterministic for identical backend output.
//!
//! ## Scope
//!
//! [`HitResolver::set_scope`] filters candidates before ranking, for example to
//! restrict hits to the elements of a modal panel.

use kurbo::Point;

use crate::types::{Candidate, Candidates};

/// The rendering backend's hit test, treated as opaque.
pub trait HitTest<K> {
    /// Append every interactable element under `at` to `out`, front to back.
    fn hit_test(&self, at: Point, out: &mut Candidates<K>);
}

impl<K, T: HitTest<K> + ?Sized> HitTest<K> for &T {
    fn hit_test(&self, at: Point, out: &mut Candidates<K>) {
        (**self).hit_test(at, out);
    }
}

/// Priority-based reduction of hit candidates.
#[derive(Clone, Debug)]
pub struct HitResolver<K> {
    scope: Option<fn(&K) -> bool>,
}

impl<K> Default for HitResolver<K> {
    fn default() -> Self {
        Self { scope: None }
    }
}

impl<K: Copy> HitResolver<K> {
    /// Create a resolver without a scope filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an optional scope filter; only elements that satisfy it are considered.
    pub fn set_scope(&mut self, scope: Option<fn(&K) -> bool>) {
        self.scope = scope;
    }

    /// Pick the winning element among `candidates`.
    pub fn resolve(&self, candidates: &[Candidate<K>]) -> Option<K> {
        let mut best: Option<&Candidate<K>> = None;
        for c in candidates {
            if let Some(f) = self.scope
                && !f(&c.element)
            {
                continue;
            }
            best = match best {
                None => Some(c),
                Some(b) if c.priority > b.priority => Some(c),
                keep => keep,
            };
        }
        best.map(|c| c.element)
    }

    /// Query `backend` at `at` and resolve the result.
    pub fn resolve_at(&self, backend: &impl HitTest<K>, at: Point) -> Option<K> {
        let mut candidates = Candidates::new();
        backend.hit_test(at, &mut candidates);
        self.resolve(&candidates)
    }
}
