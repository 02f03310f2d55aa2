//! Integration test: simulation backends end to end through the console.

use std::io::{Cursor, Write};

use kestrel_common::machine::state::MachineState;
use kestrel_machine::drivers::{self, simulation::ConsoleProcessor, simulation::SimRadio};
use kestrel_machine::hal::ChannelMode;
use kestrel_machine::loader::TomlConfigSource;
use kestrel_machine::recovery::LoopControl;
use kestrel_machine::{Bootstrap, HardwareRegistry, Supervisor, SystemState};
use tempfile::NamedTempFile;

const ROUTER_TOML: &str = r#"
name = "router"
board = "6-pack"

[stepping]
engine = "rmt"
pulse_us = 2

[i2c]
[extenders]
driver = "pca9539"

[axes.x.motor0]
driver = "stepstick"
limit_neg_pin = "gpio.26:low"
pulloff = 1.5

[axes.y.homing]
[axes.y.motor0]
driver = "stepstick"
limit_neg_pin = "gpio.27:low"
pulloff = 0.5

[axes.y.motor1]
driver = "stepstick"
pulloff = 0.2

[[spindles]]
type = "pwm"
"#;

fn registry() -> HardwareRegistry {
    let mut reg = HardwareRegistry::new();
    drivers::register_all(&mut reg);
    reg
}

#[test]
fn homing_gate_from_file_to_console() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(ROUTER_TOML.as_bytes()).unwrap();

    let reg = registry();
    let sys = SystemState::new();
    let mut source = TomlConfigSource::from_path(file.path(), &reg);
    let mut radio = SimRadio::new(None, "kestrel");
    let report = Bootstrap::new(&sys).run(&mut source, &mut radio);

    assert_eq!(report.state, MachineState::Alarm);
    assert_eq!(report.channel, ChannelMode::Pairing);

    let machine = report.machine.expect("configured");
    let y = machine.axes.get(1).expect("y axis");
    assert!(y.has_dual_motor());
    assert_eq!(y.motors_with_switches(), 2);
    assert_eq!(y.pulloff_offset(), -0.3);
    assert_eq!(machine.axes.get(0).map(|x| x.pulloff_offset()), Some(0.0));

    let handle = y.motor(1).expect("slot 1").handle();
    assert_eq!(machine.axes.find_axis_for(handle), Some(1));

    let mut console = ConsoleProcessor::new(
        Cursor::new(b"G0 X5\n$H\nG0 X5\nreset\n".to_vec()),
        Vec::new(),
    );
    let mut sup = Supervisor::new(&sys, Some(machine));
    assert_eq!(sup.step(&mut console), LoopControl::Continue);

    let out = String::from_utf8_lossy(console.output()).into_owned();
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].contains("[Alarm]"));
    assert_eq!(&lines[1..], ["error: motion blocked in Alarm", "ok", "ok"]);
    assert_eq!(sys.state.get(), MachineState::Idle);
}

#[test]
fn failing_driver_leaves_console_in_config_alarm() {
    let reg = registry();
    let sys = SystemState::new();
    let mut source = TomlConfigSource::inline(
        "[axes.z.motor0]\ndriver = \"stepstick\"\nfail_init = true\n",
        &reg,
    );
    let report = Bootstrap::new(&sys).run(&mut source, &mut SimRadio::new(Some("shop".into()), "kestrel"));
    assert_eq!(report.state, MachineState::ConfigAlarm);
    assert_eq!(report.channel, ChannelMode::Station);

    let mut console = ConsoleProcessor::new(Cursor::new(b"$X\n?\nreset\n".to_vec()), Vec::new());
    let mut sup = Supervisor::new(&sys, report.machine);
    sup.step(&mut console);

    let out = String::from_utf8_lossy(console.output()).into_owned();
    assert!(out.contains("error: configuration alarm"));
    assert!(out.contains("\"state\":\"ConfigAlarm\""));
    assert!(sys.state.is_config_alarm());
}

#[test]
fn sample_config_boots_into_homing_alarm() {
    let reg = registry();
    let sys = SystemState::new();
    let mut source = TomlConfigSource::inline(include_str!("../../../config/kestrel.toml"), &reg);
    let report = Bootstrap::new(&sys).run(&mut source, &mut SimRadio::new(Some("shop".into()), "kestrel"));

    assert_eq!(report.state, MachineState::Alarm);
    assert!(sys.homing.is_set(1));
    assert!(sys.homing.is_set(2));
    assert!(!sys.homing.is_set(0));

    let machine = report.machine.expect("configured");
    assert_eq!(machine.spindles.len(), 2);
    assert_eq!(machine.active_spindle, Some(0));
    assert_eq!(machine.axes.get(1).map(|y| y.pulloff_offset()), Some(-0.5));
}
