// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity-keyed registry of handler bundles for one gesture kind.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::error::GestureError;
use crate::types::GestureKinds;

/// Identifies one registration of one element.
///
/// Stamps increase monotonically within a registry, so a stamp taken before
/// dispatch tells apart "still the same registration" from "unregistered and
/// registered again".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Stamp(u64);

#[derive(Clone, Debug)]
struct Entry<B> {
    stamp: Stamp,
    bundle: B,
}

/// Map from element identity to a handler bundle `B`.
///
/// At most one entry per element. Inserting an element that is already present
/// is rejected rather than overwritten.
#[derive(Clone)]
pub struct GestureRegistry<K, B> {
    kind: GestureKinds,
    entries: HashMap<K, Entry<B>>,
    next_stamp: u64,
}

impl<K, B> core::fmt::Debug for GestureRegistry<K, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GestureRegistry")
            .field("kind", &self.kind)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + Hash, B> GestureRegistry<K, B> {
    /// Create an empty registry for `kind`.
    pub fn new(kind: GestureKinds) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
            next_stamp: 0,
        }
    }

    /// The gesture kind this registry serves.
    pub fn kind(&self) -> GestureKinds {
        self.kind
    }

    /// Register `bundle` for `element`.
    pub fn insert(&mut self, element: K, bundle: B) -> Result<Stamp, GestureError> {
        if self.entries.contains_key(&element) {
            return Err(GestureError::AlreadyRegistered(self.kind));
        }
        self.next_stamp += 1;
        let stamp = Stamp(self.next_stamp);
        self.entries.insert(element, Entry { stamp, bundle });
        Ok(stamp)
    }

    /// Remove the entry for `element`. Returns false if there was none.
    pub fn remove(&mut self, element: &K) -> bool {
        self.entries.remove(element).is_some()
    }

    /// The bundle registered for `element`, with its stamp.
    pub fn get(&self, element: &K) -> Option<(Stamp, &B)> {
        self.entries.get(element).map(|e| (e.stamp, &e.bundle))
    }

    /// The current stamp of `element`, if registered.
    pub fn stamp(&self, element: &K) -> Option<Stamp> {
        self.entries.get(element).map(|e| e.stamp)
    }

    /// Returns true if `element` is registered.
    pub fn contains(&self, element: &K) -> bool {
        self.entries.contains_key(element)
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy out every entry, ordered by registration.
    ///
    /// Broadcast dispatch works from this snapshot so handlers may mutate the
    /// registry while the broadcast is in flight.
    pub fn snapshot(&self) -> Vec<(K, Stamp, B)>
    where
        B: Clone,
    {
        let mut out: Vec<(K, Stamp, B)> = self
            .entries
            .iter()
            .map(|(k, e)| (*k, e.stamp, e.bundle.clone()))
            .collect();
        out.sort_by_key(|(_, stamp, _)| *stamp);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn duplicate_insert_is_rejected_and_keeps_original() {
        let mut reg: GestureRegistry<u32, &str> = GestureRegistry::new(GestureKinds::TAP);
        reg.insert(1, "first").unwrap();
        assert_eq!(
            reg.insert(1, "second"),
            Err(GestureError::AlreadyRegistered(GestureKinds::TAP))
        );
        assert_eq!(reg.get(&1).map(|(_, b)| *b), Some("first"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn removing_absent_entry_is_a_no_op() {
        let mut reg: GestureRegistry<u32, ()> = GestureRegistry::new(GestureKinds::BACK);
        assert!(!reg.remove(&7));
        reg.insert(7, ()).unwrap();
        assert!(reg.remove(&7));
        assert!(!reg.remove(&7));
        assert!(reg.is_empty());
    }

    #[test]
    fn reregistration_gets_a_fresh_stamp() {
        let mut reg: GestureRegistry<u32, ()> = GestureRegistry::new(GestureKinds::FOCUS);
        let a = reg.insert(3, ()).unwrap();
        reg.remove(&3);
        let b = reg.insert(3, ()).unwrap();
        assert_ne!(a, b);
        assert_eq!(reg.stamp(&3), Some(b));
    }

    #[test]
    fn snapshot_follows_registration_order() {
        let mut reg: GestureRegistry<u32, u32> = GestureRegistry::new(GestureKinds::TAP);
        for k in [40, 10, 30, 20] {
            reg.insert(k, k * 2).unwrap();
        }
        reg.remove(&30);
        let keys: Vec<u32> = reg.snapshot().into_iter().map(|(k, _, _)| k).collect();
        assert_eq!(keys, vec![40, 10, 20]);
    }
}
