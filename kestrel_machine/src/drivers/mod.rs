//! Hardware driver backends.
//!
//! - [`simulation`] - software backends for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `MotorDriver`, `Subsystem`, `SteppingEngine` or `Spindle`
//! 3. Register the factories in [`register_all`]

pub mod simulation;

use crate::registry::HardwareRegistry;

/// Register every built-in driver with `registry`.
pub fn register_all(registry: &mut HardwareRegistry) {
    simulation::register(registry);
}
