//! Fatal fault taxonomy.
//!
//! Every fault is fatal for the operation that raised it. Faults bubble up
//! with `?` and are caught only at the two supervisory boundaries: the end of
//! the bootstrap sequence and the end of one recovery-loop attempt. Both
//! boundaries log the fault and force `MachineState::ConfigAlarm`.

use thiserror::Error;

use crate::config::ConfigError;

/// Configuration-time errors (bind, validate, registry lookup).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Axis pulse rate exceeds the stepping engine ceiling.
    #[error("Stepping rate {rate} steps/sec exceeds the maximum rate {ceiling} (axis {axis})")]
    StepRateExceeded {
        /// Axis index.
        axis: usize,
        /// Computed `steps_per_unit * max_rate / 60`.
        rate: u32,
        /// `SteppingEngine::max_pulses_per_sec()`.
        ceiling: u32,
    },

    /// No factory registered under the requested name.
    #[error("Unknown {kind} driver '{name}'")]
    UnknownDriver {
        /// Factory family ("motor", "device", "spindle").
        kind: &'static str,
        /// Requested driver name.
        name: String,
    },

    /// An option failed semantic validation.
    #[error("Invalid option in [{section}]: {reason}")]
    InvalidOption {
        /// Section path, e.g. `axes.x.homing`.
        section: String,
        /// What was wrong.
        reason: String,
    },

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Load(#[from] ConfigError),
}

/// Fault classification used in log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Bad configuration.
    Configuration,
    /// A subsystem `init()` failed.
    HardwareInit,
    /// Assertion raised while the command loop was running.
    RuntimeAssertion,
}

/// Fatal fault raised anywhere below the supervisory boundaries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    /// Configuration-time error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Subsystem initialization failed.
    #[error("{subsystem} init failed: {reason}")]
    HardwareInit {
        /// Subsystem or driver name.
        subsystem: String,
        /// Driver-reported reason.
        reason: String,
    },

    /// Runtime assertion.
    #[error("Assertion failed: {message}")]
    RuntimeAssertion {
        /// Assertion message.
        message: String,
        /// Location or call context, when known.
        context: Option<String>,
    },
}

impl Fault {
    /// Build a `HardwareInit` fault.
    pub fn hardware(subsystem: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HardwareInit {
            subsystem: subsystem.into(),
            reason: reason.into(),
        }
    }

    /// Build a `RuntimeAssertion` fault without context.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::RuntimeAssertion {
            message: message.into(),
            context: None,
        }
    }

    /// Attach call context to a runtime assertion. Other kinds are returned unchanged.
    pub fn with_context(self, ctx: impl Into<String>) -> Self {
        match self {
            Self::RuntimeAssertion { message, .. } => Self::RuntimeAssertion {
                message,
                context: Some(ctx.into()),
            },
            other => other,
        }
    }

    /// Classification for logging.
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::Configuration(_) => FaultKind::Configuration,
            Self::HardwareInit { .. } => FaultKind::HardwareInit,
            Self::RuntimeAssertion { .. } => FaultKind::RuntimeAssertion,
        }
    }

    /// Context string for the log record (empty when none is available).
    pub fn context(&self) -> &str {
        match self {
            Self::RuntimeAssertion {
                context: Some(ctx), ..
            } => ctx,
            Self::HardwareInit { subsystem, .. } => subsystem,
            _ => "",
        }
    }
}

impl From<ConfigError> for Fault {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(ConfigurationError::Load(e))
    }
}
