// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driver errors.

use understory_controller::error::ControllerError;
use understory_gesture::error::GestureError;

/// Errors reported by the driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A gesture registration was rejected.
    #[error(transparent)]
    Gesture(#[from] GestureError),
    /// A controller tree operation failed.
    #[error(transparent)]
    Controller(#[from] ControllerError),
    /// The configuration could not be parsed.
    #[error("failed to parse driver configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// The configuration parsed but holds an unusable value.
    #[error("invalid driver configuration: {0}")]
    InvalidConfig(&'static str),
}
