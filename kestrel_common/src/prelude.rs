//! Prelude module for common re-exports.
//!
//! ```rust
//! use kestrel_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader};
pub use crate::machine::config::{
    AxisConfig, DeviceConfig, MachineConfig, MotorConfig, SpindleConfig, SteppingConfig,
};
pub use crate::machine::homing::HomingConfig;

// ─── Faults ─────────────────────────────────────────────────────────
pub use crate::error::{ConfigurationError, Fault, FaultKind};

// ─── Machine ────────────────────────────────────────────────────────
pub use crate::machine::axis::{AxisMask, axis_letter};
pub use crate::machine::state::MachineState;

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_AXES, MAX_MOTORS_PER_AXIS, MAX_SPINDLES, STALL_RETRY_LIMIT};
