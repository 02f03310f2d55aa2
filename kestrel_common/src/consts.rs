//! System-wide constants for the kestrel workspace.
//!
//! Single source of truth for all capacity limits and default paths.

use static_assertions::const_assert;

/// Maximum number of logical axes (X, Y, Z, A, B, C).
pub const MAX_AXES: usize = 6;

/// Motor slots per axis. Two slots cover a squared gantry.
pub const MAX_MOTORS_PER_AXIS: usize = 2;

/// Maximum number of configured spindles.
pub const MAX_SPINDLES: usize = 8;

/// Non-user loop exits tolerated before the stall guard freezes the controller.
///
/// The guard fires once the failure count exceeds this value, so the
/// second consecutive failure stalls.
pub const STALL_RETRY_LIMIT: u32 = 1;

/// Longest accepted step pulse width [µs].
pub const MAX_PULSE_US: u32 = 10_000;

/// Longest accepted direction setup delay [µs].
pub const MAX_DIR_DELAY_US: u32 = 10_000;

/// Default machine configuration path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/kestrel/config.toml";

/// Default pairing-mode device name for the console channel fallback.
pub const DEFAULT_PAIRING_NAME: &str = "kestrel";

// Homing mask is a u32 bit-set keyed by axis index.
const_assert!(MAX_AXES <= 32);
// Squaring needs two slots on one axis.
const_assert!(MAX_MOTORS_PER_AXIS >= 2);
const_assert!(MAX_MOTORS_PER_AXIS <= 10);
