// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration errors.

use crate::types::GestureKinds;

/// Errors reported by gesture registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GestureError {
    /// The element already has an entry in this registry.
    ///
    /// Registries never overwrite: unregister first if the handlers should change.
    #[error("element is already registered for {0:?}")]
    AlreadyRegistered(GestureKinds),
}
