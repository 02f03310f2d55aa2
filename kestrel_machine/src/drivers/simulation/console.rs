//! Line-oriented console command processor and simulated radio.
//!
//! | Input        | Effect                                          |
//! |--------------|-------------------------------------------------|
//! | `reset`, `^X`| user abort, the supervisor restarts the loop    |
//! | `fault <msg>`| raise a runtime assertion                       |
//! | `?`          | JSON status report                              |
//! | `$X`         | unlock `Alarm` (never `ConfigAlarm`)            |
//! | `$H`         | run the homing cycle, clears `Alarm`            |
//! | `G...`       | motion, rejected while motion is blocked        |
//!
//! End of input parks the processor: a controller with nothing attached
//! keeps waiting instead of cycling through restarts.

use std::io::{BufRead, Write};

use serde::Serialize;
use tracing::{debug, info, warn};

use kestrel_common::error::Fault;
use kestrel_common::machine::axis::{AXIS_LETTERS, axis_letter};
use kestrel_common::machine::state::MachineState;

use crate::hal::ControlChannel;
use crate::recovery::{CommandProcessor, Halt, ParkHalt, ProtocolExit};
use crate::system::SystemState;

/// Status line emitted for `?`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub state: MachineState,
    pub motion_allowed: bool,
    /// Letters of the axes that require homing.
    pub homing: String,
}

impl StatusReport {
    pub fn capture(system: &SystemState) -> Self {
        let state = system.state.get();
        let homing = (0..AXIS_LETTERS.len())
            .filter(|&axis| system.homing.is_set(axis))
            .map(axis_letter)
            .collect();
        Self {
            state,
            motion_allowed: state.allows_motion(),
            homing,
        }
    }
}

/// Console-driven command processor.
pub struct ConsoleProcessor<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleProcessor<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    fn reply(&mut self, text: &str) -> Result<(), Fault> {
        writeln!(self.output, "{text}")
            .and_then(|()| self.output.flush())
            .map_err(|e| Fault::assertion(format!("console write failed: {e}")))
    }

    /// Handle one line. `Some` ends the current `run`.
    fn execute(&mut self, line: &str, system: &SystemState) -> Result<Option<ProtocolExit>, Fault> {
        let state = system.state.get();
        match line {
            "" => {}
            "reset" | "^X" | "\u{18}" => return Ok(Some(ProtocolExit::Abort)),
            "?" => {
                let report = StatusReport::capture(system);
                let json = serde_json::to_string(&report)
                    .map_err(|e| Fault::assertion(format!("status encoding failed: {e}")))?;
                self.reply(&json)?;
            }
            "$X" => match state {
                MachineState::ConfigAlarm => {
                    self.reply("error: configuration alarm, fix the configuration and restart")?
                }
                MachineState::Alarm => {
                    warn!("Alarm unlocked without homing");
                    system.state.set(MachineState::Idle);
                    self.reply("ok")?;
                }
                _ => self.reply("ok")?,
            },
            "$H" => {
                if state == MachineState::ConfigAlarm {
                    self.reply("error: configuration alarm")?;
                } else {
                    system.state.set(MachineState::Homing);
                    info!(mask = ?system.homing.mask(), "Homing cycle (simulated)");
                    system.state.set(MachineState::Idle);
                    self.reply("ok")?;
                }
            }
            "fault" => return Err(Fault::assertion("injected").with_context("console")),
            _ if line.starts_with("fault ") => {
                let message = line["fault ".len()..].trim();
                return Err(Fault::assertion(message).with_context("console"));
            }
            _ if line.starts_with(['G', 'g']) => {
                if state.allows_motion() {
                    self.reply("ok")?;
                } else {
                    self.reply(&format!("error: motion blocked in {state}"))?;
                }
            }
            _ => self.reply("error: unsupported command")?,
        }
        Ok(None)
    }
}

impl<R: BufRead, W: Write> CommandProcessor for ConsoleProcessor<R, W> {
    fn reset_system(&mut self) -> Result<(), Fault> {
        debug!("System counters reset");
        Ok(())
    }

    fn reset_protocol(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn reset_parser(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn reset_planner(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn sync_positions(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn flush_input(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn report_startup(&mut self, state: MachineState) -> Result<(), Fault> {
        self.reply(&format!(
            "Kestrel {} [{}] '$H'|'$X' to unlock",
            env!("CARGO_PKG_VERSION"),
            state
        ))
    }

    fn motion_init(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn run(&mut self, system: &SystemState) -> Result<ProtocolExit, Fault> {
        let mut raw = Vec::new();
        loop {
            raw.clear();
            let read = self
                .input
                .read_until(b'\n', &mut raw)
                .map_err(|e| Fault::assertion(format!("console read failed: {e}")))?;
            if read == 0 {
                info!("Console input closed, waiting");
                ParkHalt.halt();
            }
            let Ok(line) = std::str::from_utf8(&raw) else {
                self.reply("error: invalid utf-8")?;
                continue;
            };
            if let Some(exit) = self.execute(line.trim(), system)? {
                return Ok(exit);
            }
        }
    }
}

/// Simulated wireless link: station mode needs an SSID, pairing needs a name.
#[derive(Debug, Clone)]
pub struct SimRadio {
    ssid: Option<String>,
    pairing_name: String,
}

impl SimRadio {
    pub fn new(ssid: Option<String>, pairing_name: impl Into<String>) -> Self {
        Self {
            ssid,
            pairing_name: pairing_name.into(),
        }
    }
}

impl ControlChannel for SimRadio {
    fn begin_station(&mut self) -> bool {
        match &self.ssid {
            Some(ssid) => {
                info!("Station: joined '{ssid}' (simulated)");
                true
            }
            None => false,
        }
    }

    fn begin_pairing(&mut self) -> bool {
        if self.pairing_name.is_empty() {
            return false;
        }
        info!("Pairing: advertising as '{}' (simulated)", self.pairing_name);
        true
    }
}
