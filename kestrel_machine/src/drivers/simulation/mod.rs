//! Simulation backends.
//!
//! Every backend honours a boolean `fail_init` parameter in its config
//! section, making its `init()` raise a hardware fault.

mod console;
mod device;
mod motor;
mod spindle;

pub use console::{ConsoleProcessor, SimRadio, StatusReport};
pub use device::{SimDevice, SimStepping};
pub use motor::SimMotor;
pub use spindle::SimSpindle;

use kestrel_common::machine::config::StepEngine;

use crate::registry::HardwareRegistry;

/// Motor driver names served by [`SimMotor`].
pub const MOTOR_DRIVERS: [&str; 2] = ["stepstick", "null_motor"];

/// Device driver names served by [`SimDevice`]: every section name plus
/// the pin extender chip.
pub const DEVICE_DRIVERS: [&str; 13] = [
    "i2so",
    "spi",
    "sdcard",
    "i2c",
    "extenders",
    "planner",
    "user_outputs",
    "control",
    "kinematics",
    "limits",
    "coolant",
    "probe",
    "pca9539",
];

/// Spindle types served by [`SimSpindle`].
pub const SPINDLE_TYPES: [&str; 4] = ["pwm", "relay", "laser", "null"];

/// Register every simulation backend.
pub fn register(registry: &mut HardwareRegistry) {
    for name in MOTOR_DRIVERS {
        registry.register_motor(name, |cfg, _handle| Box::new(SimMotor::from_config(cfg)));
    }
    for name in DEVICE_DRIVERS {
        registry.register_device(name, |section, cfg| Box::new(SimDevice::from_config(section, cfg)));
    }
    for engine in [
        StepEngine::Timed,
        StepEngine::Rmt,
        StepEngine::I2sStatic,
        StepEngine::I2sStream,
    ] {
        registry.register_stepping(engine.as_str(), |cfg| Box::new(SimStepping::new(cfg)));
    }
    for kind in SPINDLE_TYPES {
        registry.register_spindle(kind, |cfg| Box::new(SimSpindle::from_config(cfg)));
    }
}

/// Read the `fail_init` flag from a driver parameter table.
fn fail_init(params: &toml::Table) -> bool {
    params.get("fail_init").and_then(toml::Value::as_bool).unwrap_or(false)
}
