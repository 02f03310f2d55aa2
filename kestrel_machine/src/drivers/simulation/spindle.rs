//! Simulated spindle.

use tracing::{debug, info};

use kestrel_common::error::Fault;
use kestrel_common::machine::config::SpindleConfig;

use crate::spindle::Spindle;

#[derive(Debug)]
pub struct SimSpindle {
    name: String,
    tool: u32,
    fail: bool,
    running: bool,
}

impl SimSpindle {
    pub fn from_config(cfg: &SpindleConfig) -> Self {
        Self {
            name: cfg.name.clone().unwrap_or_else(|| cfg.kind.clone()),
            tool: cfg.tool,
            fail: super::fail_init(&cfg.params),
            running: false,
        }
    }

    /// Start rotation (test hook; the runtime layer drives real spindles).
    pub fn spin_up(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Spindle for SimSpindle {
    fn name(&self) -> &str {
        &self.name
    }

    fn tool(&self) -> u32 {
        self.tool
    }

    fn init(&mut self) -> Result<(), Fault> {
        if self.fail {
            return Err(Fault::hardware(self.name.as_str(), "spindle output unavailable"));
        }
        info!(tool = self.tool, "Spindle {} (simulated)", self.name);
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            debug!(spindle = %self.name, "Spindle stopped");
        }
        self.running = false;
    }
}
