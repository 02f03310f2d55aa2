//! Hardware driver registry.
//!
//! Maps driver names from the configuration to factories for motor drivers,
//! device subsystems, stepping engines and spindles. Constructed at startup,
//! populated via the `register_*` methods and passed to
//! [`Machine::build`](crate::machine::Machine::build) by reference. No global
//! state, so tests can register instrumented backends.

use std::collections::HashMap;

use tracing::trace;

use kestrel_common::error::ConfigurationError;
use kestrel_common::machine::config::{DeviceConfig, MotorConfig, SpindleConfig, SteppingConfig};

use crate::hal::{SteppingEngine, Subsystem};
use crate::motor::{DriverHandle, MotorCapability, MotorDriver, MotorSlot};
use crate::spindle::Spindle;

/// Builds a motor driver for one axis slot.
pub type MotorFactory =
    Box<dyn Fn(&MotorConfig, DriverHandle) -> Box<dyn MotorDriver> + Send + Sync>;
/// Builds an optional subsystem; receives the section name.
pub type DeviceFactory = Box<dyn Fn(&str, &DeviceConfig) -> Box<dyn Subsystem> + Send + Sync>;
pub type SteppingFactory = Box<dyn Fn(&SteppingConfig) -> Box<dyn SteppingEngine> + Send + Sync>;
pub type SpindleFactory = Box<dyn Fn(&SpindleConfig) -> Box<dyn Spindle> + Send + Sync>;

/// Registry of available hardware drivers.
#[derive(Default)]
pub struct HardwareRegistry {
    motors: HashMap<String, MotorFactory>,
    devices: HashMap<String, DeviceFactory>,
    stepping: HashMap<String, SteppingFactory>,
    spindles: HashMap<String, SpindleFactory>,
}

fn insert_unique<F>(map: &mut HashMap<String, F>, kind: &str, name: &str, factory: F) {
    if map.contains_key(name) {
        panic!("{kind} driver '{name}' is already registered");
    }
    map.insert(name.to_string(), factory);
}

impl HardwareRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a motor driver factory.
    ///
    /// # Panics
    /// Panics if a motor driver with the same name is already registered.
    pub fn register_motor<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&MotorConfig, DriverHandle) -> Box<dyn MotorDriver> + Send + Sync + 'static,
    {
        insert_unique(&mut self.motors, "Motor", name, Box::new(factory));
    }

    /// Register a device subsystem factory.
    ///
    /// # Panics
    /// Panics if a device driver with the same name is already registered.
    pub fn register_device<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&str, &DeviceConfig) -> Box<dyn Subsystem> + Send + Sync + 'static,
    {
        insert_unique(&mut self.devices, "Device", name, Box::new(factory));
    }

    /// Register a stepping engine factory, keyed by engine name (`timed`, `rmt`, ...).
    ///
    /// # Panics
    /// Panics on duplicate registration.
    pub fn register_stepping<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&SteppingConfig) -> Box<dyn SteppingEngine> + Send + Sync + 'static,
    {
        insert_unique(&mut self.stepping, "Stepping", name, Box::new(factory));
    }

    /// Register a spindle factory, keyed by spindle `type`.
    ///
    /// # Panics
    /// Panics on duplicate registration.
    pub fn register_spindle<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&SpindleConfig) -> Box<dyn Spindle> + Send + Sync + 'static,
    {
        insert_unique(&mut self.spindles, "Spindle", name, Box::new(factory));
    }

    /// Create the motor for `axis`/`slot`. The driver is not initialized.
    ///
    /// # Errors
    /// `ConfigurationError::UnknownDriver` if `cfg.driver` is not registered.
    pub fn create_motor(
        &self,
        axis: usize,
        slot: usize,
        cfg: &MotorConfig,
    ) -> Result<MotorSlot, ConfigurationError> {
        let factory = self
            .motors
            .get(cfg.driver.as_str())
            .ok_or_else(|| unknown("motor", &cfg.driver))?;
        let handle = DriverHandle::allocate();
        let capability = if cfg.has_switches() {
            MotorCapability::SwitchCapable
        } else {
            MotorCapability::Plain
        };
        trace!(axis, slot, handle = handle.raw(), "Creating motor driver");
        Ok(MotorSlot::new(handle, factory(cfg, handle), capability, cfg.pulloff))
    }

    /// Create the subsystem for `section`, using its `driver` or the section name.
    pub fn create_device(
        &self,
        section: &str,
        cfg: &DeviceConfig,
    ) -> Result<Box<dyn Subsystem>, ConfigurationError> {
        let name = cfg.driver_or(section);
        let factory = self.devices.get(name).ok_or_else(|| unknown("device", name))?;
        Ok(factory(section, cfg))
    }

    pub fn create_stepping(
        &self,
        name: &str,
        cfg: &SteppingConfig,
    ) -> Result<Box<dyn SteppingEngine>, ConfigurationError> {
        let factory = self.stepping.get(name).ok_or_else(|| unknown("stepping", name))?;
        Ok(factory(cfg))
    }

    pub fn create_spindle(
        &self,
        cfg: &SpindleConfig,
    ) -> Result<Box<dyn Spindle>, ConfigurationError> {
        let factory = self
            .spindles
            .get(cfg.kind.as_str())
            .ok_or_else(|| unknown("spindle", &cfg.kind))?;
        Ok(factory(cfg))
    }

    /// List all registered motor driver names.
    pub fn list_motor_drivers(&self) -> Vec<&str> {
        self.motors.keys().map(String::as_str).collect()
    }
}

fn unknown(kind: &'static str, name: &str) -> ConfigurationError {
    ConfigurationError::UnknownDriver {
        kind,
        name: name.to_string(),
    }
}
