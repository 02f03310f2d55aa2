//! Simulated subsystems and stepping engine.

use tracing::{debug, info};

use kestrel_common::consts::MAX_AXES;
use kestrel_common::error::Fault;
use kestrel_common::machine::config::{DeviceConfig, StepEngine, SteppingConfig};

use crate::hal::{SteppingEngine, Subsystem};

/// Generic simulated subsystem for any device section.
#[derive(Debug)]
pub struct SimDevice {
    section: String,
    driver: String,
    fail: bool,
    initialized: bool,
}

impl SimDevice {
    pub fn from_config(section: &str, cfg: &DeviceConfig) -> Self {
        Self {
            section: section.to_string(),
            driver: cfg.driver_or(section).to_string(),
            fail: super::fail_init(&cfg.params),
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Subsystem for SimDevice {
    fn name(&self) -> &str {
        &self.section
    }

    fn init(&mut self) -> Result<(), Fault> {
        if self.fail {
            return Err(Fault::hardware(
                self.section.as_str(),
                format!("{} did not respond", self.driver),
            ));
        }
        info!("{}: {} (simulated)", self.section, self.driver);
        self.initialized = true;
        Ok(())
    }
}

/// Simulated step generator keeping per-axis step counters.
#[derive(Debug)]
pub struct SimStepping {
    engine: StepEngine,
    max_pulses: u32,
    steps: [i32; MAX_AXES],
    fail: bool,
    initialized: bool,
}

impl SimStepping {
    pub fn new(cfg: &SteppingConfig) -> Self {
        Self {
            engine: cfg.engine,
            max_pulses: cfg.max_pulses_per_sec(),
            steps: [0; MAX_AXES],
            fail: false,
            initialized: false,
        }
    }

    /// Engine whose `init()` always fails.
    pub fn failing(cfg: &SteppingConfig) -> Self {
        Self {
            fail: true,
            ..Self::new(cfg)
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl SteppingEngine for SimStepping {
    fn name(&self) -> &str {
        self.engine.as_str()
    }

    fn init(&mut self) -> Result<(), Fault> {
        if self.fail {
            return Err(Fault::hardware("stepping", "timer allocation failed"));
        }
        self.initialized = true;
        Ok(())
    }

    fn max_pulses_per_sec(&self) -> u32 {
        self.max_pulses
    }

    fn set_motor_steps(&mut self, axis: usize, steps: i32) {
        if let Some(slot) = self.steps.get_mut(axis) {
            *slot = steps;
        }
    }

    fn motor_steps(&self, axis: usize) -> i32 {
        self.steps.get(axis).copied().unwrap_or(0)
    }

    fn reset(&mut self) -> Result<(), Fault> {
        debug!(engine = self.engine.as_str(), "Stepping reset");
        Ok(())
    }
}
