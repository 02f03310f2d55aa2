//! Simulated motor driver.

use tracing::debug;

use kestrel_common::error::Fault;
use kestrel_common::machine::config::MotorConfig;

use crate::motor::MotorDriver;

/// Motor driver that only records its init.
#[derive(Debug)]
pub struct SimMotor {
    driver: String,
    fail: bool,
    initialized: bool,
}

impl SimMotor {
    pub fn from_config(cfg: &MotorConfig) -> Self {
        Self {
            driver: cfg.driver.clone(),
            fail: super::fail_init(&cfg.params),
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl MotorDriver for SimMotor {
    fn name(&self) -> &str {
        &self.driver
    }

    fn init(&mut self) -> Result<(), Fault> {
        if self.fail {
            return Err(Fault::hardware(self.driver.as_str(), "simulated driver fault"));
        }
        debug!(driver = %self.driver, "Simulated motor ready");
        self.initialized = true;
        Ok(())
    }
}
