//! Machine configuration schema.
//!
//! All config types use `serde::Deserialize` for TOML loading. Optional
//! sections use `Option` (absence means "not configured", never an error)
//! and optional fields use `#[serde(default)]`.
//!
//! # TOML Example
//!
//! ```toml
//! name = "gantry router"
//! board = "6-pack"
//!
//! [start]
//! must_home = true
//!
//! [stepping]
//! engine = "rmt"
//! pulse_us = 2
//!
//! [i2c]
//! [extenders]
//!
//! [axes.y]
//! steps_per_mm = 80.0
//! max_rate = 5000.0
//!
//! [axes.y.homing]
//! seek_rate = 2500.0
//!
//! [axes.y.motor0]
//! driver = "stepstick"
//! limit_neg_pin = "gpio.26:low"
//! pulloff = 1.5
//!
//! [axes.y.motor1]
//! driver = "stepstick"
//! pulloff = 1.0
//!
//! [[spindles]]
//! type = "pwm"
//! tool = 0
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::consts::{
    MAX_AXES, MAX_DIR_DELAY_US, MAX_MOTORS_PER_AXIS, MAX_PULSE_US, MAX_SPINDLES,
};

use super::axis::axis_letter;
use super::homing::HomingConfig;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level machine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Machine name, reported at boot.
    #[serde(default = "default_unnamed")]
    pub name: String,
    /// Board name, reported at boot.
    #[serde(default = "default_unnamed")]
    pub board: String,

    /// Boot-time policies.
    #[serde(default)]
    pub start: StartConfig,
    /// Step generation engine.
    #[serde(default)]
    pub stepping: SteppingConfig,
    /// Axis definitions.
    #[serde(default)]
    pub axes: AxesConfig,

    #[serde(default)]
    pub i2so: Option<DeviceConfig>,
    #[serde(default)]
    pub spi: Option<DeviceConfig>,
    /// SD storage; only brought up when `spi` is configured.
    #[serde(default)]
    pub sdcard: Option<DeviceConfig>,
    #[serde(default)]
    pub i2c: Option<DeviceConfig>,
    /// Pin extenders; virtualize pin addressing for everything after them.
    #[serde(default)]
    pub extenders: Option<DeviceConfig>,
    #[serde(default)]
    pub planner: Option<DeviceConfig>,
    #[serde(default)]
    pub user_outputs: Option<DeviceConfig>,
    #[serde(default)]
    pub control: Option<DeviceConfig>,
    #[serde(default)]
    pub kinematics: Option<DeviceConfig>,
    /// Travel/limit checking.
    #[serde(default)]
    pub limits: Option<DeviceConfig>,
    #[serde(default)]
    pub coolant: Option<DeviceConfig>,
    #[serde(default)]
    pub probe: Option<DeviceConfig>,

    /// Spindles in selection order; index 0 is active after boot.
    #[serde(default)]
    pub spindles: Vec<SpindleConfig>,
}

fn default_unnamed() -> String {
    "None".to_string()
}

impl MachineConfig {
    /// Validate limits that serde cannot express.
    ///
    /// Step-rate checks need the stepping engine and run when the machine is
    /// assembled, not here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spindles.len() > MAX_SPINDLES {
            return Err(ConfigError::ValidationError(format!(
                "{} spindles configured, maximum is {}",
                self.spindles.len(),
                MAX_SPINDLES
            )));
        }
        if self.stepping.pulse_us > MAX_PULSE_US {
            return Err(ConfigError::ValidationError(format!(
                "stepping.pulse_us {} exceeds {MAX_PULSE_US}",
                self.stepping.pulse_us
            )));
        }
        if self.stepping.dir_delay_us > MAX_DIR_DELAY_US {
            return Err(ConfigError::ValidationError(format!(
                "stepping.dir_delay_us {} exceeds {MAX_DIR_DELAY_US}",
                self.stepping.dir_delay_us
            )));
        }
        for (idx, axis) in self.axes.iter() {
            if let Some(homing) = &axis.homing {
                homing.validate().map_err(|e| {
                    ConfigError::ValidationError(format!(
                        "axes.{}.homing: {e}",
                        axis_letter(idx).to_ascii_lowercase()
                    ))
                })?;
            }
            if axis.steps_per_unit <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "axes.{}: steps_per_unit {} must be > 0",
                    axis_letter(idx).to_ascii_lowercase(),
                    axis.steps_per_unit
                )));
            }
        }
        Ok(())
    }
}

// ─── Boot Policies ──────────────────────────────────────────────────

/// Boot-time state policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartConfig {
    /// Enter Alarm at boot when any axis has homing configured.
    #[serde(default = "default_true")]
    pub must_home: bool,
    /// Enter Alarm at every boot regardless of homing.
    #[serde(default)]
    pub force_alarm: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            must_home: true,
            force_alarm: false,
        }
    }
}

// ─── Stepping ───────────────────────────────────────────────────────

/// Step pulse generation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepEngine {
    /// Timer interrupt bit-banging.
    #[default]
    Timed,
    /// Remote-control peripheral pulses.
    Rmt,
    /// I2S shift register, one sample per step.
    I2sStatic,
    /// I2S shift register, streamed.
    I2sStream,
}

impl StepEngine {
    /// Registry key of the engine (matches the TOML spelling).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Timed => "timed",
            Self::Rmt => "rmt",
            Self::I2sStatic => "i2s_static",
            Self::I2sStream => "i2s_stream",
        }
    }
}

/// Stepping engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteppingConfig {
    #[serde(default)]
    pub engine: StepEngine,
    /// Step pulse width [µs].
    #[serde(default = "default_pulse_us")]
    pub pulse_us: u32,
    /// Direction setup delay [µs].
    #[serde(default)]
    pub dir_delay_us: u32,
    /// Motor idle time before disable [ms] (255 = never).
    #[serde(default = "default_idle_ms")]
    pub idle_ms: u32,
    /// Step segment buffer size.
    #[serde(default = "default_segments")]
    pub segments: u32,
}

fn default_pulse_us() -> u32 {
    4
}
fn default_idle_ms() -> u32 {
    255
}
fn default_segments() -> u32 {
    12
}

impl Default for SteppingConfig {
    fn default() -> Self {
        Self {
            engine: StepEngine::Timed,
            pulse_us: 4,
            dir_delay_us: 0,
            idle_ms: 255,
            segments: 12,
        }
    }
}

impl SteppingConfig {
    /// Highest step pulse rate the engine can sustain [pulses/s].
    ///
    /// Timer and RMT engines need a pulse high and low phase plus the
    /// direction delay; I2S engines emit one bit per 4 µs frame.
    pub fn max_pulses_per_sec(&self) -> u32 {
        let period_us = match self.engine {
            StepEngine::Timed | StepEngine::Rmt => self
                .pulse_us
                .saturating_mul(2)
                .saturating_add(self.dir_delay_us),
            StepEngine::I2sStatic | StepEngine::I2sStream => self.pulse_us.max(2).saturating_mul(4),
        };
        1_000_000 / period_us.max(1)
    }
}

// ─── Axes ───────────────────────────────────────────────────────────

/// Axis sections keyed by letter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxesConfig {
    #[serde(default)]
    pub x: Option<AxisConfig>,
    #[serde(default)]
    pub y: Option<AxisConfig>,
    #[serde(default)]
    pub z: Option<AxisConfig>,
    #[serde(default)]
    pub a: Option<AxisConfig>,
    #[serde(default)]
    pub b: Option<AxisConfig>,
    #[serde(default)]
    pub c: Option<AxisConfig>,
}

impl AxesConfig {
    /// Axis section by index.
    pub fn get(&self, axis: usize) -> Option<&AxisConfig> {
        match axis {
            0 => self.x.as_ref(),
            1 => self.y.as_ref(),
            2 => self.z.as_ref(),
            3 => self.a.as_ref(),
            4 => self.b.as_ref(),
            5 => self.c.as_ref(),
            _ => None,
        }
    }

    /// Configured axes in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &AxisConfig)> {
        (0..MAX_AXES).filter_map(move |idx| self.get(idx).map(|ax| (idx, ax)))
    }

    /// Highest configured index + 1 (0 when no axis is configured).
    pub fn number_axis(&self) -> usize {
        self.iter().last().map_or(0, |(idx, _)| idx + 1)
    }
}

/// Per-axis options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisConfig {
    /// Steps per unit of travel.
    #[serde(default = "default_steps_per_unit", alias = "steps_per_mm")]
    pub steps_per_unit: f64,
    /// Maximum rate [units/min].
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,
    /// Acceleration [units/s²].
    #[serde(default = "default_acceleration")]
    pub acceleration: f64,
    /// Maximum travel [units].
    #[serde(default = "default_max_travel")]
    pub max_travel: f64,
    #[serde(default)]
    pub soft_limits: bool,
    /// Backlash compensation [units].
    #[serde(default)]
    pub backlash: f64,
    /// Homing section; presence marks the axis as requiring homing.
    #[serde(default)]
    pub homing: Option<HomingConfig>,
    #[serde(default)]
    pub motor0: Option<MotorConfig>,
    #[serde(default)]
    pub motor1: Option<MotorConfig>,
}

fn default_steps_per_unit() -> f64 {
    80.0
}
fn default_max_rate() -> f64 {
    1000.0
}
fn default_acceleration() -> f64 {
    25.0
}
fn default_max_travel() -> f64 {
    1000.0
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            steps_per_unit: 80.0,
            max_rate: 1000.0,
            acceleration: 25.0,
            max_travel: 1000.0,
            soft_limits: false,
            backlash: 0.0,
            homing: None,
            motor0: None,
            motor1: None,
        }
    }
}

impl AxisConfig {
    /// Motor sections indexed by slot.
    pub fn motors(&self) -> [Option<&MotorConfig>; MAX_MOTORS_PER_AXIS] {
        [self.motor0.as_ref(), self.motor1.as_ref()]
    }
}

// ─── Motors ─────────────────────────────────────────────────────────

/// One motor slot of an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorConfig {
    /// Registered motor driver name.
    #[serde(default = "default_motor_driver")]
    pub driver: String,
    #[serde(default)]
    pub limit_neg_pin: Option<String>,
    #[serde(default)]
    pub limit_pos_pin: Option<String>,
    #[serde(default)]
    pub limit_all_pin: Option<String>,
    /// Trip an alarm on switch activation outside homing.
    #[serde(default)]
    pub hard_limits: bool,
    /// Homing backoff distance [units].
    #[serde(default)]
    pub pulloff: f64,
    /// Driver-specific parameters.
    #[serde(flatten)]
    pub params: toml::Table,
}

fn default_motor_driver() -> String {
    "null_motor".to_string()
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            driver: default_motor_driver(),
            limit_neg_pin: None,
            limit_pos_pin: None,
            limit_all_pin: None,
            hard_limits: false,
            pulloff: 0.0,
            params: toml::Table::new(),
        }
    }
}

impl MotorConfig {
    /// Whether any limit switch pin is wired to this motor.
    pub fn has_switches(&self) -> bool {
        self.limit_neg_pin.is_some() || self.limit_pos_pin.is_some() || self.limit_all_pin.is_some()
    }
}

// ─── Devices and Spindles ───────────────────────────────────────────

/// Generic optional subsystem section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Registered device driver name; defaults to the section name.
    #[serde(default)]
    pub driver: Option<String>,
    /// Driver-specific parameters.
    #[serde(flatten)]
    pub params: toml::Table,
}

impl DeviceConfig {
    /// Driver name, falling back to the section name.
    pub fn driver_or<'a>(&'a self, section: &'a str) -> &'a str {
        self.driver.as_deref().unwrap_or(section)
    }
}

/// One `[[spindles]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpindleConfig {
    /// Registered spindle type.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Tool number this spindle answers to.
    #[serde(default)]
    pub tool: u32,
    /// Type-specific parameters.
    #[serde(flatten)]
    pub params: toml::Table,
}
