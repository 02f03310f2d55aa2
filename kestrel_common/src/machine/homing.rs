//! Homing configuration for a single axis.
//!
//! The presence of a `[axes.<letter>.homing]` section is what marks an axis
//! as requiring homing; the values themselves are consumed by the homing
//! cycle in the runtime layer.

use serde::{Deserialize, Serialize};

/// Homing configuration for a single axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomingConfig {
    /// Auto-homing cycle this axis belongs to (0 = only homed explicitly).
    #[serde(default = "default_cycle")]
    pub cycle: u8,
    /// Home towards the positive end of travel.
    #[serde(default = "default_true")]
    pub positive_direction: bool,
    /// Machine position assigned at the home switch [mm].
    #[serde(default)]
    pub mpos: f64,
    /// Locate feed rate [mm/min].
    #[serde(default = "default_feed_rate")]
    pub feed_rate: f64,
    /// Seek rate [mm/min].
    #[serde(default = "default_seek_rate")]
    pub seek_rate: f64,
    /// Debounce delay after each switch hit [ms].
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u32,
    /// Seek travel multiplier relative to max travel.
    #[serde(default = "default_scaler")]
    pub seek_scaler: f64,
    /// Feed travel multiplier relative to pulloff.
    #[serde(default = "default_scaler")]
    pub feed_scaler: f64,
}

fn default_cycle() -> u8 {
    1
}
fn default_true() -> bool {
    true
}
fn default_feed_rate() -> f64 {
    50.0
}
fn default_seek_rate() -> f64 {
    200.0
}
fn default_settle_ms() -> u32 {
    250
}
fn default_scaler() -> f64 {
    1.1
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            cycle: 1,
            positive_direction: true,
            mpos: 0.0,
            feed_rate: 50.0,
            seek_rate: 200.0,
            settle_ms: 250,
            seek_scaler: 1.1,
            feed_scaler: 1.1,
        }
    }
}

impl HomingConfig {
    /// Validate rates and scalers.
    pub fn validate(&self) -> Result<(), String> {
        if self.feed_rate <= 0.0 {
            return Err(format!("feed_rate {} must be > 0", self.feed_rate));
        }
        if self.seek_rate <= 0.0 {
            return Err(format!("seek_rate {} must be > 0", self.seek_rate));
        }
        if self.seek_scaler < 1.0 || self.feed_scaler < 1.0 {
            return Err(format!(
                "scalers must be >= 1.0 (seek {}, feed {})",
                self.seek_scaler, self.feed_scaler
            ));
        }
        Ok(())
    }
}
