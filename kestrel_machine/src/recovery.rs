//! Steady-state supervisory loop with a bounded-retry stall guard.
//!
//! Each attempt resets transient state, then blocks in the command processor
//! until it returns. A fault raised anywhere in an attempt is caught at the
//! end of that attempt and turns into `ConfigAlarm`. Every exit that was not
//! a user abort counts as a failure; once failures exceed
//! [`STALL_RETRY_LIMIT`] the loop stops making attempts and parks for good.
//! Only a power cycle leaves that state.

use tracing::{debug, info};

use kestrel_common::consts::STALL_RETRY_LIMIT;
use kestrel_common::error::Fault;
use kestrel_common::machine::state::MachineState;

use crate::machine::Machine;
use crate::system::SystemState;

/// Why the command processor returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolExit {
    /// User-issued abort (soft reset).
    Abort,
    /// Internal condition the processor does not handle itself.
    Internal,
}

/// Runtime command layer driven by the supervisor.
///
/// Every method may raise a fault; the supervisor catches it at the end of
/// the attempt.
pub trait CommandProcessor {
    /// Reset system-state counters.
    fn reset_system(&mut self) -> Result<(), Fault>;
    fn reset_protocol(&mut self) -> Result<(), Fault>;
    /// Restore parser modal defaults.
    fn reset_parser(&mut self) -> Result<(), Fault>;
    /// Drop queued planner blocks.
    fn reset_planner(&mut self) -> Result<(), Fault>;
    /// Resync planner and parser positions to the machine position.
    fn sync_positions(&mut self) -> Result<(), Fault>;
    fn flush_input(&mut self) -> Result<(), Fault>;
    /// Emit the startup banner / status.
    fn report_startup(&mut self, state: MachineState) -> Result<(), Fault>;
    fn motion_init(&mut self) -> Result<(), Fault>;

    /// Process commands until an abort or an internal exit.
    fn run(&mut self, system: &SystemState) -> Result<ProtocolExit, Fault>;
}

/// Counts non-abort exits against a fixed limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryCounter {
    failures: u32,
    limit: u32,
}

impl RetryCounter {
    pub const fn new(limit: u32) -> Self {
        Self { failures: 0, limit }
    }

    /// Count one failure. Returns `true` once the limit is exceeded.
    pub fn record_failure(&mut self) -> bool {
        self.failures = self.failures.saturating_add(1);
        self.failures > self.limit
    }

    #[inline]
    pub const fn failures(&self) -> u32 {
        self.failures
    }
}

impl Default for RetryCounter {
    fn default() -> Self {
        Self::new(STALL_RETRY_LIMIT)
    }
}

/// Outcome of one supervised attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Start another attempt.
    Continue,
    /// Stall guard fired.
    Stall,
}

/// Terminal wait entered when the stall guard fires.
pub trait Halt {
    fn halt(&mut self) -> !;
}

/// Parks the calling thread forever.
#[derive(Debug, Default)]
pub struct ParkHalt;

impl Halt for ParkHalt {
    fn halt(&mut self) -> ! {
        loop {
            std::thread::park();
        }
    }
}

/// Drives the command processor for the rest of the process lifetime.
pub struct Supervisor<'a> {
    system: &'a SystemState,
    machine: Option<Machine>,
    retries: RetryCounter,
}

impl<'a> Supervisor<'a> {
    /// `machine` is `None` when bootstrap could not load a configuration.
    pub fn new(system: &'a SystemState, machine: Option<Machine>) -> Self {
        Self {
            system,
            machine,
            retries: RetryCounter::default(),
        }
    }

    /// Run one attempt and apply the stall guard.
    pub fn step(&mut self, processor: &mut dyn CommandProcessor) -> LoopControl {
        let exit = match self.attempt(processor) {
            Ok(exit) => exit,
            Err(fault) => {
                self.system.enter_config_alarm("command loop", &fault);
                ProtocolExit::Internal
            }
        };

        if exit == ProtocolExit::Abort {
            debug!("Abort, restarting command loop");
            return LoopControl::Continue;
        }

        if self.retries.record_failure() {
            info!("Stalling due to too many failures");
            LoopControl::Stall
        } else {
            LoopControl::Continue
        }
    }

    /// Attempt forever; hand off to `halt` once the stall guard fires.
    pub fn run_forever(mut self, processor: &mut dyn CommandProcessor, halt: &mut dyn Halt) -> ! {
        loop {
            if self.step(processor) == LoopControl::Stall {
                halt.halt();
            }
        }
    }

    pub fn retries(&self) -> &RetryCounter {
        &self.retries
    }

    pub fn machine(&self) -> Option<&Machine> {
        self.machine.as_ref()
    }

    fn attempt(&mut self, processor: &mut dyn CommandProcessor) -> Result<ProtocolExit, Fault> {
        processor.reset_system()?;
        processor.reset_protocol()?;
        processor.reset_parser()?;
        processor.reset_planner()?;

        if !self.system.state.is_config_alarm() {
            if let Some(machine) = self.machine.as_mut() {
                if let Some(spindle) = machine.active_spindle_mut() {
                    spindle.stop();
                }
                machine.stepping.reset()?;
            }
        }

        processor.sync_positions()?;
        processor.flush_input()?;
        processor.report_startup(self.system.state.get())?;
        processor.motion_init()?;

        processor.run(self.system)
    }
}
