//! Integration test: ordered bring-up and the initial machine state.

use kestrel_common::machine::state::MachineState;
use kestrel_machine::hal::ChannelMode;
use kestrel_machine::loader::TomlConfigSource;
use kestrel_machine::startup_log::StartupLog;
use kestrel_machine::{BootReport, Bootstrap, SystemState};
use tracing_subscriber::layer::SubscriberExt;

use super::recorder::{CallLog, RecRadio, recording_registry};

const FULL_TOML: &str = r#"
name = "gantry"
board = "bench"

[i2so]
[spi]
[sdcard]
[i2c]
[extenders]
driver = "extenders"
[planner]
[user_outputs]
[control]
[kinematics]
[limits]
[coolant]
[probe]

[axes.x.motor0]
driver = "rec"
label = "x0"
[axes.x.motor1]
driver = "rec"
label = "x1"

[axes.z.motor0]
driver = "rec"
label = "z0"

[[spindles]]
type = "rec"
name = "router"

[[spindles]]
type = "rec"
name = "laser"
"#;

fn boot(sys: &SystemState, toml: &str, log: &CallLog) -> BootReport {
    let registry = recording_registry(log);
    let mut source = TomlConfigSource::inline(toml, &registry);
    let mut radio = RecRadio {
        station_ok: true,
        log: log.clone(),
    };
    Bootstrap::new(sys).run(&mut source, &mut radio)
}

#[test]
fn full_bring_up_order() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let report = boot(&sys, FULL_TOML, &log);

    assert_eq!(
        log.entries(),
        vec![
            "device:i2so",
            "device:spi",
            "device:sdcard",
            "device:i2c",
            "device:extenders",
            "stepping:init",
            "device:planner",
            "device:user_outputs",
            "motor:x0",
            "motor:x1",
            "motor:z0",
            "device:control",
            "device:kinematics",
            "steps:0=0",
            "steps:2=0",
            "device:limits",
            "spindle:init:router",
            "spindle:init:laser",
            "device:coolant",
            "device:probe",
            "radio:station",
        ]
    );
    assert_eq!(report.state, MachineState::Idle);
    assert_eq!(report.channel, ChannelMode::Station);

    let machine = report.machine.expect("machine configured");
    assert_eq!(machine.active_spindle, Some(0));
    assert_eq!(machine.axes.number_axis(), 3);
}

#[test]
fn extenders_before_any_motor() {
    let log = CallLog::default();
    let sys = SystemState::new();
    boot(
        &sys,
        r#"
[extenders]
[axes.y.motor0]
driver = "rec"
label = "y0"
"#,
        &log,
    );

    let ext = log.position("device:extenders").expect("extenders init");
    let motor = log.position("motor:y0").expect("motor init");
    assert!(ext < motor);
}

#[test]
fn sd_card_needs_spi() {
    let log = CallLog::default();
    let sys = SystemState::new();
    boot(&sys, "[sdcard]\n[i2c]\n", &log);
    assert!(!log.contains("device:sdcard"));
    assert!(log.contains("device:i2c"));
}

#[test]
fn load_failure_runs_only_the_channel() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let report = boot(&sys, "[axes.x\nbroken", &log);

    assert_eq!(log.entries(), vec!["radio:station"]);
    assert!(report.machine.is_none());
    assert_eq!(report.state, MachineState::ConfigAlarm);
}

#[test]
fn step_rate_violation_is_a_load_failure() {
    let log = CallLog::default();
    let sys = SystemState::new();
    // 80 * 6000 / 60 = 8000 > 1_000_000 / 200
    let report = boot(
        &sys,
        r#"
[stepping]
pulse_us = 100
[i2c]
[axes.x]
steps_per_unit = 80.0
max_rate = 6000.0
"#,
        &log,
    );

    assert_eq!(report.state, MachineState::ConfigAlarm);
    assert!(!log.contains("device:i2c"));
    assert!(!log.contains("stepping:init"));
    assert!(log.contains("radio:station"));
}

#[test]
fn hardware_fault_stops_bring_up_and_keeps_channel() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let report = boot(
        &sys,
        r#"
[i2c]
[extenders]
fail_init = true
[planner]
[axes.x.motor0]
driver = "rec"
label = "x0"
"#,
        &log,
    );

    assert_eq!(
        log.entries(),
        vec!["device:i2c", "device:extenders", "radio:station"]
    );
    assert_eq!(report.state, MachineState::ConfigAlarm);
    assert!(report.machine.is_some());
}

#[test]
fn station_failure_falls_back_to_pairing() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let registry = recording_registry(&log);
    let mut source = TomlConfigSource::inline("", &registry);
    let mut radio = RecRadio {
        station_ok: false,
        log: log.clone(),
    };
    let report = Bootstrap::new(&sys).run(&mut source, &mut radio);

    assert_eq!(report.channel, ChannelMode::Pairing);
    assert_eq!(log.entries(), vec!["stepping:init", "radio:station", "radio:pairing"]);
}

#[test]
fn must_home_with_homing_axis_enters_alarm() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let report = boot(&sys, "[axes.y.homing]\n[axes.z]\n", &log);

    assert_eq!(report.state, MachineState::Alarm);
    assert!(sys.homing.is_set(1));
    assert!(!sys.homing.is_set(0));
    assert!(!sys.homing.is_set(2));
}

#[test]
fn must_home_without_homing_axis_stays_idle() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let report = boot(&sys, "[start]\nmust_home = true\n[axes.x]\n", &log);
    assert_eq!(report.state, MachineState::Idle);
    assert!(!sys.homing.any());
}

#[test]
fn homing_alarm_can_be_disabled() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let report = boot(&sys, "[start]\nmust_home = false\n[axes.x.homing]\n", &log);
    assert_eq!(report.state, MachineState::Idle);
    assert!(sys.homing.is_set(0));
}

#[test]
fn force_alarm_policy() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let report = boot(&sys, "[start]\nforce_alarm = true\nmust_home = false\n", &log);
    assert_eq!(report.state, MachineState::Alarm);
}

#[test]
fn reload_rebuilds_homing_mask() {
    let log = CallLog::default();
    let sys = SystemState::new();
    boot(&sys, "[axes.x.homing]\n", &log);
    assert!(sys.homing.is_set(0));

    boot(&sys, "[axes.z.homing]\n", &log);
    assert!(!sys.homing.is_set(0));
    assert!(sys.homing.is_set(2));
}

#[test]
fn startup_log_is_captured_and_closed() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let startup = StartupLog::new();
    let subscriber = tracing_subscriber::registry().with(startup.clone());

    let report = tracing::subscriber::with_default(subscriber, || {
        let registry = recording_registry(&log);
        let mut source = TomlConfigSource::inline("name = \"bench\"\n", &registry);
        let mut radio = RecRadio {
            station_ok: true,
            log: log.clone(),
        };
        Bootstrap::new(&sys)
            .with_startup_log(startup.clone())
            .run(&mut source, &mut radio)
    });

    assert!(report.startup_lines.iter().any(|l| l.contains("Machine bench")));
    assert!(!startup.is_open());
}

#[test]
fn load_failure_still_closes_startup_log() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let startup = StartupLog::new();
    let subscriber = tracing_subscriber::registry().with(startup.clone());

    let report = tracing::subscriber::with_default(subscriber, || {
        let registry = recording_registry(&log);
        let mut source = TomlConfigSource::inline("[axes.x\nbroken", &registry);
        let mut radio = RecRadio {
            station_ok: true,
            log: log.clone(),
        };
        Bootstrap::new(&sys)
            .with_startup_log(startup.clone())
            .run(&mut source, &mut radio)
    });

    assert_eq!(report.state, MachineState::ConfigAlarm);
    assert!(report.startup_lines.iter().any(|l| l.contains("State ConfigAlarm")));
    assert!(!startup.is_open());
}

#[test]
fn alarm_raised_after_init_leaves_late_devices_idle() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let registry = recording_registry(&log);
    let mut source = TomlConfigSource::inline(
        r#"
[limits]
[coolant]
[probe]

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
    let report = Bootstrap::new(&sys)
        .with_post_init(|_| {
            sys.state.force_config_alarm();
            Ok(())
        })
        .run(&mut source, &mut radio);

    assert_eq!(report.state, MachineState::ConfigAlarm);
    assert_eq!(log.entries(), vec!["stepping:init", "radio:station"]);
    assert_eq!(report.machine.expect("configured").active_spindle, None);
}

#[test]
fn oversized_pulse_width_is_a_load_failure() {
    let log = CallLog::default();
    let sys = SystemState::new();
    let report = boot(&sys, "[stepping]\npulse_us = 3000000000\n", &log);

    assert_eq!(report.state, MachineState::ConfigAlarm);
    assert!(report.machine.is_none());
    assert_eq!(report.channel, ChannelMode::Station);
    assert_eq!(log.entries(), vec!["radio:station"]);
}
