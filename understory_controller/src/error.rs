// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller tree errors.

use crate::types::ControllerId;

/// Errors reported by [`ControllerTree`](crate::tree::ControllerTree) operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// Instantiation had no parent scope and the tree has no root scope.
    #[error("no parent scope given and no root scope configured")]
    MissingRootScope,
    /// The id refers to a closed controller.
    #[error("controller {0:?} is not alive")]
    Stale(ControllerId),
    /// The child is the parent itself or one of its ancestors.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Requested parent.
        parent: ControllerId,
        /// Requested child.
        child: ControllerId,
    },
    /// The controller has no model, or a model of another type.
    #[error("controller {0:?} has no model of the requested type")]
    ModelMismatch(ControllerId),
}
