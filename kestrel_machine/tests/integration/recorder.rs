//! Instrumented backends recording call order.

use std::sync::Arc;

use parking_lot::Mutex;

use kestrel_common::error::Fault;
use kestrel_common::machine::config::StepEngine;
use kestrel_machine::hal::{ControlChannel, SteppingEngine, Subsystem};
use kestrel_machine::motor::MotorDriver;
use kestrel_machine::registry::HardwareRegistry;
use kestrel_machine::spindle::Spindle;

const DEVICES: [&str; 12] = [
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
];

/// Shared, ordered record of hardware calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == entry)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.position(entry).is_some()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

fn fails(params: &toml::Table) -> bool {
    params.get("fail_init").and_then(toml::Value::as_bool).unwrap_or(false)
}

fn attempt(log: &CallLog, entry: String, fail: bool) -> Result<(), Fault> {
    log.record(entry.clone());
    if fail {
        Err(Fault::hardware(entry, "injected failure"))
    } else {
        Ok(())
    }
}

struct RecDevice {
    section: String,
    fail: bool,
    log: CallLog,
}

impl Subsystem for RecDevice {
    fn name(&self) -> &str {
        &self.section
    }

    fn init(&mut self) -> Result<(), Fault> {
        attempt(&self.log, format!("device:{}", self.section), self.fail)
    }
}

struct RecMotor {
    label: String,
    fail: bool,
    log: CallLog,
}

impl MotorDriver for RecMotor {
    fn name(&self) -> &str {
        "rec"
    }

    fn init(&mut self) -> Result<(), Fault> {
        attempt(&self.log, format!("motor:{}", self.label), self.fail)
    }
}

struct RecStepping {
    max_pulses: u32,
    steps: [i32; 6],
    log: CallLog,
}

impl SteppingEngine for RecStepping {
    fn name(&self) -> &str {
        "rec"
    }

    fn init(&mut self) -> Result<(), Fault> {
        attempt(&self.log, "stepping:init".into(), false)
    }

    fn max_pulses_per_sec(&self) -> u32 {
        self.max_pulses
    }

    fn set_motor_steps(&mut self, axis: usize, steps: i32) {
        self.log.record(format!("steps:{axis}={steps}"));
        self.steps[axis] = steps;
    }

    fn motor_steps(&self, axis: usize) -> i32 {
        self.steps[axis]
    }

    fn reset(&mut self) -> Result<(), Fault> {
        self.log.record("stepping:reset");
        Ok(())
    }
}

struct RecSpindle {
    name: String,
    fail: bool,
    log: CallLog,
}

impl Spindle for RecSpindle {
    fn name(&self) -> &str {
        &self.name
    }

    fn tool(&self) -> u32 {
        0
    }

    fn init(&mut self) -> Result<(), Fault> {
        attempt(&self.log, format!("spindle:init:{}", self.name), self.fail)
    }

    fn stop(&mut self) {
        self.log.record(format!("spindle:stop:{}", self.name));
    }
}

/// Radio recording which mode was attempted.
pub struct RecRadio {
    pub station_ok: bool,
    pub log: CallLog,
}

impl ControlChannel for RecRadio {
    fn begin_station(&mut self) -> bool {
        self.log.record("radio:station");
        self.station_ok
    }

    fn begin_pairing(&mut self) -> bool {
        self.log.record("radio:pairing");
        true
    }
}

/// Registry whose backends all write to `log`.
///
/// Motors are registered as `rec` and log their `label` parameter.
pub fn recording_registry(log: &CallLog) -> HardwareRegistry {
    let mut reg = HardwareRegistry::new();

    for section in DEVICES {
        let log = log.clone();
        reg.register_device(section, move |section, cfg| {
            Box::new(RecDevice {
                section: section.to_string(),
                fail: fails(&cfg.params),
                log: log.clone(),
            })
        });
    }

    let motor_log = log.clone();
    reg.register_motor("rec", move |cfg, _handle| {
        Box::new(RecMotor {
            label: cfg
                .params
                .get("label")
                .and_then(toml::Value::as_str)
                .unwrap_or("?")
                .to_string(),
            fail: fails(&cfg.params),
            log: motor_log.clone(),
        })
    });

    for engine in [
        StepEngine::Timed,
        StepEngine::Rmt,
        StepEngine::I2sStatic,
        StepEngine::I2sStream,
    ] {
        let log = log.clone();
        reg.register_stepping(engine.as_str(), move |cfg| {
            Box::new(RecStepping {
                max_pulses: cfg.max_pulses_per_sec(),
                steps: [0; 6],
                log: log.clone(),
            })
        });
    }

    let spindle_log = log.clone();
    reg.register_spindle("rec", move |cfg| {
        Box::new(RecSpindle {
            name: cfg.name.clone().unwrap_or_else(|| "spindle".into()),
            fail: fails(&cfg.params),
            log: spindle_log.clone(),
        })
    });

    reg
}
