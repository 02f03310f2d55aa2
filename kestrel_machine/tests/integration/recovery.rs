//! Integration test: supervised command loop and the stall guard.

use std::collections::VecDeque;

use kestrel_common::error::Fault;
use kestrel_common::machine::state::MachineState;
use kestrel_machine::loader::TomlConfigSource;
use kestrel_machine::recovery::{CommandProcessor, Halt, LoopControl, ProtocolExit};
use kestrel_machine::{Bootstrap, Machine, Supervisor, SystemState};

use super::recorder::{CallLog, RecRadio, recording_registry};

/// Command processor replaying scripted exits and logging every call.
struct Script {
    exits: VecDeque<Result<ProtocolExit, Fault>>,
    log: CallLog,
}

impl Script {
    fn new(log: &CallLog, exits: Vec<Result<ProtocolExit, Fault>>) -> Self {
        Self {
            exits: exits.into(),
            log: log.clone(),
        }
    }
}

impl CommandProcessor for Script {
    fn reset_system(&mut self) -> Result<(), Fault> {
        self.log.record("cp:reset_system");
        Ok(())
    }
    fn reset_protocol(&mut self) -> Result<(), Fault> {
        self.log.record("cp:reset_protocol");
        Ok(())
    }
    fn reset_parser(&mut self) -> Result<(), Fault> {
        self.log.record("cp:reset_parser");
        Ok(())
    }
    fn reset_planner(&mut self) -> Result<(), Fault> {
        self.log.record("cp:reset_planner");
        Ok(())
    }
    fn sync_positions(&mut self) -> Result<(), Fault> {
        self.log.record("cp:sync_positions");
        Ok(())
    }
    fn flush_input(&mut self) -> Result<(), Fault> {
        self.log.record("cp:flush_input");
        Ok(())
    }
    fn report_startup(&mut self, state: MachineState) -> Result<(), Fault> {
        self.log.record(format!("cp:report_startup:{state}"));
        Ok(())
    }
    fn motion_init(&mut self) -> Result<(), Fault> {
        self.log.record("cp:motion_init");
        Ok(())
    }
    fn run(&mut self, _system: &SystemState) -> Result<ProtocolExit, Fault> {
        self.log.record("cp:run");
        self.exits
            .pop_front()
            .unwrap_or(Err(Fault::assertion("script exhausted")))
    }
}

struct PanicHalt;

impl Halt for PanicHalt {
    fn halt(&mut self) -> ! {
        panic!("stalled");
    }
}

fn booted(sys: &SystemState, log: &CallLog) -> Option<Machine> {
    let registry = recording_registry(log);
    let mut source = TomlConfigSource::inline(
        r#"
[axes.x.motor0]
driver = "rec"
label = "x0"

[[spindles]]
type = "rec"
name = "router"
"#,
        &registry,
    );
    let mut radio = RecRadio {
        station_ok: true,
        log: log.clone(),
    };
    let report = Bootstrap::new(sys).run(&mut source, &mut radio);
    log.clear();
    report.machine
}

#[test]
fn attempt_order_with_hardware_resets() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let machine = booted(&sys, &log);
    let mut sup = Supervisor::new(&sys, machine);

    let mut script = Script::new(&log, vec![Ok(ProtocolExit::Abort)]);
    assert_eq!(sup.step(&mut script), LoopControl::Continue);

    assert_eq!(
        log.entries(),
        vec![
            "cp:reset_system",
            "cp:reset_protocol",
            "cp:reset_parser",
            "cp:reset_planner",
            "spindle:stop:router",
            "stepping:reset",
            "cp:sync_positions",
            "cp:flush_input",
            "cp:report_startup:Idle",
            "cp:motion_init",
            "cp:run",
        ]
    );
}

#[test]
fn config_alarm_skips_spindle_and_stepping_reset() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let machine = booted(&sys, &log);
    sys.state.force_config_alarm();
    let mut sup = Supervisor::new(&sys, machine);

    let mut script = Script::new(&log, vec![Ok(ProtocolExit::Abort)]);
    sup.step(&mut script);

    assert!(!log.contains("spindle:stop:router"));
    assert!(!log.contains("stepping:reset"));
    assert!(log.contains("cp:report_startup:ConfigAlarm"));
    assert!(log.contains("cp:run"));
}

#[test]
fn runtime_fault_enters_config_alarm() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let machine = booted(&sys, &log);
    let mut sup = Supervisor::new(&sys, machine);

    let mut script = Script::new(
        &log,
        vec![Err(Fault::assertion("step queue overflow")), Ok(ProtocolExit::Abort)],
    );
    assert_eq!(sup.step(&mut script), LoopControl::Continue);
    assert_eq!(sys.state.get(), MachineState::ConfigAlarm);

    log.clear();
    assert_eq!(sup.step(&mut script), LoopControl::Continue);
    assert!(!log.contains("stepping:reset"));
}

#[test]
fn failure_then_abort_does_not_stall() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let mut sup = Supervisor::new(&sys, None);
    let mut script = Script::new(
        &log,
        vec![Ok(ProtocolExit::Internal), Ok(ProtocolExit::Abort)],
    );

    assert_eq!(sup.step(&mut script), LoopControl::Continue);
    assert_eq!(sup.step(&mut script), LoopControl::Continue);
    assert_eq!(sup.retries().failures(), 1);
}

#[test]
#[should_panic(expected = "stalled")]
fn two_failures_trigger_stall_guard() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let sup = Supervisor::new(&sys, None);
    let mut script = Script::new(
        &log,
        vec![
            Ok(ProtocolExit::Internal),
            Err(Fault::assertion("limit switch stuck")),
        ],
    );
    sup.run_forever(&mut script, &mut PanicHalt);
}

#[test]
fn aborts_never_stall() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let mut sup = Supervisor::new(&sys, None);
    let mut script = Script::new(&log, vec![Ok(ProtocolExit::Abort); 10]);
    for _ in 0..10 {
        assert_eq!(sup.step(&mut script), LoopControl::Continue);
    }
    assert_eq!(sup.retries().failures(), 0);
}
