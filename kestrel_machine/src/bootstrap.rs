//! One-time ordered hardware bring-up.
//!
//! # Order
//!
//! 1. Load configuration (on failure skip to 8)
//! 2. I2S outputs, SPI then SD card, I2C, pin extenders
//! 3. Stepping engine
//! 4. Planner, user outputs, axes (index order), control inputs, kinematics
//! 5. Zero the step counter of every configured axis
//! 6. Post-init hook
//! 7. Initial state, limits, spindles (select 0), coolant, probe
//! 8. Control channel, close the startup log
//!
//! Pin extenders come before everything that touches pins because they
//! virtualize pin addressing. A fault anywhere in 2-7 is caught once, after
//! step 7, and turns into `ConfigAlarm`; step 8 always runs.

use tracing::{debug, info, warn};

use kestrel_common::error::Fault;
use kestrel_common::machine::state::MachineState;

use crate::hal::{ChannelMode, ControlChannel, Subsystem, bring_up_channel};
use crate::loader::ConfigSource;
use crate::machine::Machine;
use crate::spindle::switch_spindle;
use crate::startup_log::StartupLog;
use crate::system::SystemState;

/// Machine-specific hook run after the axes are up, before the state decision.
pub type PostInitHook<'a> = Box<dyn FnOnce(&mut Machine) -> Result<(), Fault> + 'a>;

/// Result of the bootstrap sequence.
pub struct BootReport {
    /// `None` when the configuration could not be loaded.
    pub machine: Option<Machine>,
    /// State at the end of bootstrap.
    pub state: MachineState,
    pub channel: ChannelMode,
    /// Startup log transcript (empty when no log was attached).
    pub startup_lines: Vec<String>,
}

/// Bootstrap sequencer. Consumed by [`run`](Self::run), so it runs once.
pub struct Bootstrap<'a> {
    system: &'a SystemState,
    post_init: Option<PostInitHook<'a>>,
    startup_log: Option<StartupLog>,
}

impl<'a> Bootstrap<'a> {
    pub fn new(system: &'a SystemState) -> Self {
        Self {
            system,
            post_init: None,
            startup_log: None,
        }
    }

    /// Install the post-init hook (no-op when absent).
    pub fn with_post_init<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut Machine) -> Result<(), Fault> + 'a,
    {
        self.post_init = Some(Box::new(hook));
        self
    }

    /// Startup log to close at the end of the sequence.
    pub fn with_startup_log(mut self, log: StartupLog) -> Self {
        self.startup_log = Some(log);
        self
    }

    /// Run the full sequence. Never fails: faults end in `ConfigAlarm`.
    pub fn run(
        mut self,
        source: &mut dyn ConfigSource,
        channel: &mut dyn ControlChannel,
    ) -> BootReport {
        self.system.homing.clear();

        let machine = match source.load() {
            Ok(mut machine) => {
                info!("Machine {}", machine.name);
                info!("Board {}", machine.board);
                if let Err(fault) = self.bring_up(&mut machine) {
                    self.system.enter_config_alarm("bootstrap", &fault);
                }
                Some(machine)
            }
            Err(fault) => {
                self.system.enter_config_alarm("configuration load", &fault);
                None
            }
        };

        let state = self.system.state.get();
        info!("State {state}");

        let channel = bring_up_channel(channel);
        info!(?channel, "Control channel up");

        let startup_lines = self.startup_log.map(|log| log.close()).unwrap_or_default();

        BootReport {
            machine,
            state,
            channel,
            startup_lines,
        }
    }

    fn bring_up(&mut self, m: &mut Machine) -> Result<(), Fault> {
        init_subsystem(&mut m.i2so)?;
        if m.spi.is_some() {
            init_subsystem(&mut m.spi)?;
            init_subsystem(&mut m.sd_card)?;
        } else if m.sd_card.is_some() {
            warn!("SD card configured without SPI, skipped");
        }
        init_subsystem(&mut m.i2c)?;
        init_subsystem(&mut m.extenders)?;

        info!(
            engine = m.stepping.name(),
            max_pulses_per_sec = m.stepping.max_pulses_per_sec(),
            "Stepping"
        );
        m.stepping.init()?;

        init_subsystem(&mut m.planner)?;
        init_subsystem(&mut m.user_outputs)?;
        m.axes.init(&self.system.homing)?;
        init_subsystem(&mut m.control)?;
        init_subsystem(&mut m.kinematics)?;

        for group in m.axes.iter() {
            m.stepping.set_motor_steps(group.index(), 0);
        }

        if let Some(hook) = self.post_init.take() {
            hook(m)?;
        }

        self.decide_state(m)
    }

    fn decide_state(&self, m: &mut Machine) -> Result<(), Fault> {
        let state = &self.system.state;
        if state.is_config_alarm() {
            warn!("Configuration alarm raised during bring-up, remaining devices left idle");
            return Ok(());
        }
        state.set(if m.start.force_alarm {
            MachineState::Alarm
        } else {
            MachineState::Idle
        });

        init_subsystem(&mut m.limits)?;

        if m.start.must_home && self.system.homing.any() {
            info!(mask = ?self.system.homing.mask(), "Homing required before motion");
            state.set(MachineState::Alarm);
        }

        for spindle in m.spindles.iter_mut() {
            debug!(spindle = spindle.name(), tool = spindle.tool(), "Init");
            spindle.init()?;
        }
        switch_spindle(0, &mut m.spindles, &mut m.active_spindle)?;

        init_subsystem(&mut m.coolant)?;
        init_subsystem(&mut m.probe)
    }
}

fn init_subsystem(subsystem: &mut Option<Box<dyn Subsystem>>) -> Result<(), Fault> {
    if let Some(s) = subsystem {
        debug!(subsystem = s.name(), "Init");
        s.init()?;
    }
    Ok(())
}
