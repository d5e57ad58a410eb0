// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element identities.

/// Identity of an interactive element.
///
/// Ids are never reused within one [`ElementIds`] allocator, so a destroyed
/// element's id cannot alias a later element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic [`ElementId`] allocator.
#[derive(Clone, Debug, Default)]
pub struct ElementIds {
    last: u64,
}

impl ElementIds {
    /// Create an allocator whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id.
    pub fn next_id(&mut self) -> ElementId {
        self.last += 1;
        ElementId(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_fresh() {
        let mut ids = ElementIds::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!((a.get(), b.get()), (1, 2));
    }
}
