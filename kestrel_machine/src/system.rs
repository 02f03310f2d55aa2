//! Shared system state store.
//!
//! `SystemState` is owned by the top-level driver and passed by reference
//! into the bootstrap sequence and the recovery loop. Each field has a single
//! writer on the control flow; the real-time layer may read the state and
//! force an alarm, which the atomic cell makes safe across contexts.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::error;

use kestrel_common::error::Fault;
use kestrel_common::machine::state::MachineState;

use crate::homing::HomingMask;

/// Atomic holder for the current `MachineState`.
#[derive(Debug)]
pub struct MachineStateCell(AtomicU8);

impl MachineStateCell {
    pub const fn new(state: MachineState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    /// Current state. An unknown raw value reads as `ConfigAlarm`.
    #[inline]
    pub fn get(&self) -> MachineState {
        MachineState::from_u8(self.0.load(Ordering::Acquire)).unwrap_or(MachineState::ConfigAlarm)
    }

    #[inline]
    pub fn set(&self, state: MachineState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Enter the terminal-for-boot fault state.
    #[inline]
    pub fn force_config_alarm(&self) {
        self.set(MachineState::ConfigAlarm);
    }

    #[inline]
    pub fn is_config_alarm(&self) -> bool {
        self.get() == MachineState::ConfigAlarm
    }
}

impl Default for MachineStateCell {
    fn default() -> Self {
        Self::new(MachineState::default())
    }
}

/// Process-wide machine state and homing mask.
#[derive(Debug, Default)]
pub struct SystemState {
    pub state: MachineStateCell,
    pub homing: HomingMask,
}

impl SystemState {
    pub const fn new() -> Self {
        Self {
            state: MachineStateCell::new(MachineState::Idle),
            homing: HomingMask::new(),
        }
    }

    /// Log a fault caught at a supervisory boundary and enter ConfigAlarm.
    pub fn enter_config_alarm(&self, boundary: &str, fault: &Fault) {
        error!(
            boundary,
            kind = ?fault.kind(),
            context = fault.context(),
            "Critical error: {fault}"
        );
        self.state.force_config_alarm();
    }
}
