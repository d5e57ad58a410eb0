// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal rectangle-stack hit-test backend.
//!
//! Useful for tests, tools, and hosts whose visual layer is a flat list of
//! screen-space rectangles. Richer scenes implement [`HitTest`] over their own
//! spatial structures instead.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::resolve::HitTest;
use crate::types::{Candidate, Candidates, Priority};

#[derive(Clone, Debug)]
struct Layer<K> {
    element: K,
    bounds: Rect,
    priority: Priority,
}

/// Screen-space rectangles ordered front to back.
#[derive(Clone, Debug)]
pub struct HitStack<K> {
    layers: Vec<Layer<K>>,
}

impl<K> Default for HitStack<K> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<K: Copy + Eq> HitStack<K> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `element` in front of everything else.
    pub fn push_front(&mut self, element: K, bounds: Rect, priority: Priority) {
        self.layers.insert(
            0,
            Layer {
                element,
                bounds,
                priority,
            },
        );
    }

    /// Add `element` behind everything else.
    pub fn push_back(&mut self, element: K, bounds: Rect, priority: Priority) {
        self.layers.push(Layer {
            element,
            bounds,
            priority,
        });
    }

    /// Remove `element`. Returns false if it was not present.
    pub fn remove(&mut self, element: K) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.element != element);
        before != self.layers.len()
    }

    /// Move or resize `element`.
    pub fn set_bounds(&mut self, element: K, bounds: Rect) -> bool {
        self.layer_mut(element).map(|l| l.bounds = bounds).is_some()
    }

    /// Change the priority of `element`.
    pub fn set_priority(&mut self, element: K, priority: Priority) -> bool {
        self.layer_mut(element)
            .map(|l| l.priority = priority)
            .is_some()
    }

    /// Current bounds of `element`.
    pub fn bounds(&self, element: K) -> Option<Rect> {
        self.layers
            .iter()
            .find(|l| l.element == element)
            .map(|l| l.bounds)
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn layer_mut(&mut self, element: K) -> Option<&mut Layer<K>> {
        self.layers.iter_mut().find(|l| l.element == element)
    }
}

impl<K: Copy + Eq> HitTest<K> for HitStack<K> {
    fn hit_test(&self, at: Point, out: &mut Candidates<K>) {
        out.extend(
            self.layers
                .iter()
                .filter(|l| l.bounds.contains(at))
                .map(|l| Candidate::new(l.element, l.priority)),
        );
    }
}
