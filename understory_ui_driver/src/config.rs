// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driver configuration.

use core::time::Duration;

use kurbo::Rect;
use serde::Deserialize;
use understory_gesture::handlers::DEFAULT_HOLD_THRESHOLD;
use understory_gesture::types::InputMode;

use crate::error::DriverError;

/// Settings for a [`UiDriver`](crate::driver::UiDriver).
///
/// Every field is optional in TOML; missing fields take their defaults.
///
/// ```toml
/// mode = "direct"
/// hold_threshold_secs = 0.35
/// navigate_step = 4.0
/// screen_width = 1280.0
/// screen_height = 720.0
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Initial addressing mode.
    pub mode: InputMode,
    /// Hold threshold used by [`UiDriver::hold_handlers`](crate::driver::UiDriver::hold_handlers).
    pub hold_threshold_secs: f64,
    /// Distance between navigation probes.
    pub navigate_step: f64,
    /// Screen width; navigation probes stop at the screen edge.
    pub screen_width: f64,
    /// Screen height.
    pub screen_height: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::Targeted,
            hold_threshold_secs: DEFAULT_HOLD_THRESHOLD.as_secs_f64(),
            navigate_step: 1.0,
            screen_width: 1920.0,
            screen_height: 1080.0,
        }
    }
}

impl DriverConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), DriverError> {
        self.hold_threshold()?;
        if !(self.navigate_step.is_finite() && self.navigate_step > 0.0) {
            return Err(DriverError::InvalidConfig(
                "navigate_step must be positive and finite",
            ));
        }
        if !(self.screen_width.is_finite() && self.screen_height.is_finite())
            || self.screen_width <= 0.0
            || self.screen_height <= 0.0
        {
            return Err(DriverError::InvalidConfig(
                "screen size must be positive and finite",
            ));
        }
        Ok(())
    }

    /// The hold threshold as a duration.
    pub fn hold_threshold(&self) -> Result<Duration, DriverError> {
        Duration::try_from_secs_f64(self.hold_threshold_secs).map_err(|_| {
            DriverError::InvalidConfig("hold_threshold_secs must be non-negative and finite")
        })
    }

    /// Screen rectangle navigation stays within.
    pub fn screen_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.screen_width, self.screen_height)
    }
}
