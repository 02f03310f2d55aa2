//! Configured machine: every subsystem created from one `MachineConfig`.
//!
//! `Machine::build` creates drivers through the registry and validates every
//! axis against the stepping ceiling. Nothing is initialized here; the
//! bootstrap sequence owns the init order.

use kestrel_common::error::{ConfigurationError, Fault};
use kestrel_common::machine::config::{DeviceConfig, MachineConfig, StartConfig};

use crate::axes::Axes;
use crate::hal::{SteppingEngine, Subsystem};
use crate::registry::HardwareRegistry;
use crate::spindle::{Spindle, SpindleList};

/// Owner of every configured subsystem.
pub struct Machine {
    pub name: String,
    pub board: String,
    pub start: StartConfig,

    pub i2so: Option<Box<dyn Subsystem>>,
    pub spi: Option<Box<dyn Subsystem>>,
    pub sd_card: Option<Box<dyn Subsystem>>,
    pub i2c: Option<Box<dyn Subsystem>>,
    pub extenders: Option<Box<dyn Subsystem>>,
    pub stepping: Box<dyn SteppingEngine>,
    pub planner: Option<Box<dyn Subsystem>>,
    pub user_outputs: Option<Box<dyn Subsystem>>,
    pub axes: Axes,
    pub control: Option<Box<dyn Subsystem>>,
    pub kinematics: Option<Box<dyn Subsystem>>,
    pub limits: Option<Box<dyn Subsystem>>,
    pub spindles: SpindleList,
    pub active_spindle: Option<usize>,
    pub coolant: Option<Box<dyn Subsystem>>,
    pub probe: Option<Box<dyn Subsystem>>,
}

fn optional(
    registry: &HardwareRegistry,
    section: &str,
    cfg: &Option<DeviceConfig>,
) -> Result<Option<Box<dyn Subsystem>>, ConfigurationError> {
    cfg.as_ref().map(|c| registry.create_device(section, c)).transpose()
}

impl Machine {
    /// Bare machine with only a stepping engine. Used by tests and by
    /// callers that assemble subsystems by hand.
    pub fn new(name: impl Into<String>, stepping: Box<dyn SteppingEngine>) -> Self {
        Self {
            name: name.into(),
            board: "None".to_string(),
            start: StartConfig::default(),
            i2so: None,
            spi: None,
            sd_card: None,
            i2c: None,
            extenders: None,
            stepping,
            planner: None,
            user_outputs: None,
            axes: Axes::new(),
            control: None,
            kinematics: None,
            limits: None,
            spindles: SpindleList::new(),
            active_spindle: None,
            coolant: None,
            probe: None,
        }
    }

    /// Create every configured driver and validate every axis.
    ///
    /// # Errors
    /// `Fault::Configuration` for schema violations, unknown driver names,
    /// or an axis exceeding the stepping pulse-rate ceiling.
    pub fn build(cfg: &MachineConfig, registry: &HardwareRegistry) -> Result<Self, Fault> {
        cfg.validate()?;

        let stepping = registry.create_stepping(cfg.stepping.engine.as_str(), &cfg.stepping)?;
        let ceiling = stepping.max_pulses_per_sec();
        let axes = Axes::from_config(&cfg.axes, registry, ceiling)?;

        let mut spindles = SpindleList::new();
        for spindle_cfg in &cfg.spindles {
            let spindle = registry.create_spindle(spindle_cfg)?;
            spindles.push(spindle).map_err(|_| ConfigurationError::InvalidOption {
                section: "spindles".into(),
                reason: "too many spindles".into(),
            })?;
        }

        Ok(Self {
            name: cfg.name.clone(),
            board: cfg.board.clone(),
            start: cfg.start,
            i2so: optional(registry, "i2so", &cfg.i2so)?,
            spi: optional(registry, "spi", &cfg.spi)?,
            sd_card: optional(registry, "sdcard", &cfg.sdcard)?,
            i2c: optional(registry, "i2c", &cfg.i2c)?,
            extenders: optional(registry, "extenders", &cfg.extenders)?,
            stepping,
            planner: optional(registry, "planner", &cfg.planner)?,
            user_outputs: optional(registry, "user_outputs", &cfg.user_outputs)?,
            axes,
            control: optional(registry, "control", &cfg.control)?,
            kinematics: optional(registry, "kinematics", &cfg.kinematics)?,
            limits: optional(registry, "limits", &cfg.limits)?,
            spindles,
            active_spindle: None,
            coolant: optional(registry, "coolant", &cfg.coolant)?,
            probe: optional(registry, "probe", &cfg.probe)?,
        })
    }

    /// Currently selected spindle, if any.
    pub fn active_spindle_mut(&mut self) -> Option<&mut Box<dyn Spindle>> {
        let idx = self.active_spindle?;
        self.spindles.get_mut(idx)
    }
}

impl Drop for Machine {
    fn drop(&mut self) {
        self.axes.release();
    }
}
