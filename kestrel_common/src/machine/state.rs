//! Machine state enumeration.
//!
//! `#[repr(u8)]` so the state can live in an atomic cell shared with the
//! real-time layer.

use serde::{Deserialize, Serialize};

/// Global machine state.
///
/// `ConfigAlarm` is terminal for the current boot: it is entered on any
/// fatal fault and only a power-cycle leaves it. It blocks motion but keeps
/// configuration and inspection commands available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MachineState {
    /// Ready, no motion.
    Idle = 0,
    /// Motion locked until homing or unlock.
    Alarm = 1,
    /// G-code check mode, no motion.
    CheckMode = 2,
    /// Homing cycle running.
    Homing = 3,
    /// Program running.
    Cycle = 4,
    /// Feed hold.
    Hold = 5,
    /// Jogging.
    Jog = 6,
    /// Safety door open.
    SafetyDoor = 7,
    /// Sleeping.
    Sleep = 8,
    /// Fatal configuration or runtime fault.
    ConfigAlarm = 9,
}

impl MachineState {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Alarm),
            2 => Some(Self::CheckMode),
            3 => Some(Self::Homing),
            4 => Some(Self::Cycle),
            5 => Some(Self::Hold),
            6 => Some(Self::Jog),
            7 => Some(Self::SafetyDoor),
            8 => Some(Self::Sleep),
            9 => Some(Self::ConfigAlarm),
            _ => None,
        }
    }

    /// Whether motion-producing commands are accepted.
    #[inline]
    pub const fn allows_motion(&self) -> bool {
        !matches!(self, Self::Alarm | Self::ConfigAlarm | Self::Sleep)
    }

    /// Configuration and inspection commands are never blocked.
    #[inline]
    pub const fn allows_configuration(&self) -> bool {
        true
    }

    /// Status-report name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Alarm => "Alarm",
            Self::CheckMode => "Check",
            Self::Homing => "Home",
            Self::Cycle => "Run",
            Self::Hold => "Hold",
            Self::Jog => "Jog",
            Self::SafetyDoor => "Door",
            Self::Sleep => "Sleep",
            Self::ConfigAlarm => "ConfigAlarm",
        }
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
