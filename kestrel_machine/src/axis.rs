//! Logical machine axis.
//!
//! An `AxisGroup` owns a fixed-capacity arena of optional motor slots plus
//! the axis kinematics and an optional homing configuration. It validates
//! the pulse-rate ceiling at configuration time, initializes its motors in
//! slot order, and applies gantry squaring.
//!
//! ## Squaring
//!
//! When exactly two slots are populated and exactly one of them reports a
//! limit switch after motor init, both slots are forced to report switches:
//! the single physical switch is logically valid for both sides of a squared
//! gantry.

use tracing::{debug, info};

use kestrel_common::consts::MAX_MOTORS_PER_AXIS;
use kestrel_common::error::{ConfigurationError, Fault};
use kestrel_common::machine::axis::axis_letter;
use kestrel_common::machine::config::AxisConfig;
use kestrel_common::machine::homing::HomingConfig;

use crate::homing::HomingMask;
use crate::motor::{DriverHandle, MotorSlot};
use crate::registry::HardwareRegistry;

/// Kinematic options of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisKinematics {
    /// Steps per unit of travel.
    pub steps_per_unit: f64,
    /// Maximum rate [units/min].
    pub max_rate: f64,
    /// Acceleration [units/s²].
    pub acceleration: f64,
    /// Maximum travel [units].
    pub max_travel: f64,
    pub soft_limits: bool,
    /// Backlash compensation [units].
    pub backlash: f64,
}

impl From<&AxisConfig> for AxisKinematics {
    fn from(cfg: &AxisConfig) -> Self {
        Self {
            steps_per_unit: cfg.steps_per_unit,
            max_rate: cfg.max_rate,
            acceleration: cfg.acceleration,
            max_travel: cfg.max_travel,
            soft_limits: cfg.soft_limits,
            backlash: cfg.backlash,
        }
    }
}

impl Default for AxisKinematics {
    fn default() -> Self {
        Self::from(&AxisConfig::default())
    }
}

/// One logical axis and the motors it owns.
#[derive(Debug)]
pub struct AxisGroup {
    axis: usize,
    kinematics: AxisKinematics,
    homing: Option<HomingConfig>,
    motors: [Option<MotorSlot>; MAX_MOTORS_PER_AXIS],
}

impl AxisGroup {
    /// Empty axis with no motors and no homing.
    pub fn new(axis: usize, kinematics: AxisKinematics) -> Self {
        Self {
            axis,
            kinematics,
            homing: None,
            motors: std::array::from_fn(|_| None),
        }
    }

    /// Bind the axis options, creating each configured motor through `registry`.
    ///
    /// Motor drivers are created here but not initialized.
    pub fn configure(
        axis: usize,
        options: &AxisConfig,
        registry: &HardwareRegistry,
    ) -> Result<Self, ConfigurationError> {
        let mut group = Self::new(axis, AxisKinematics::from(options));
        group.homing = options.homing.clone();

        for (slot, motor_cfg) in options.motors().into_iter().enumerate() {
            if let Some(cfg) = motor_cfg {
                let motor = registry.create_motor(axis, slot, cfg)?;
                debug!(
                    axis = %axis_letter(axis),
                    slot,
                    driver = %cfg.driver,
                    switches = motor.has_switches(),
                    "Motor bound"
                );
                group.motors[slot] = Some(motor);
            }
        }
        Ok(group)
    }

    /// Attach a homing configuration.
    pub fn with_homing(mut self, homing: HomingConfig) -> Self {
        self.homing = Some(homing);
        self
    }

    /// Place `motor` in `slot`, returning the previous occupant.
    ///
    /// # Panics
    /// Panics if `slot >= MAX_MOTORS_PER_AXIS`.
    pub fn set_motor(&mut self, slot: usize, motor: MotorSlot) -> Option<MotorSlot> {
        self.motors[slot].replace(motor)
    }

    /// Pulse rate this axis demands at max rate [steps/s], truncated.
    #[inline]
    pub fn step_rate(&self) -> u32 {
        (self.kinematics.steps_per_unit * self.kinematics.max_rate / 60.0) as u32
    }

    /// Check the axis pulse rate against the stepping engine ceiling.
    ///
    /// Must run after all options are bound and before `init()`.
    pub fn validate(&self, max_pulses_per_sec: u32) -> Result<(), ConfigurationError> {
        let rate = self.step_rate();
        if rate > max_pulses_per_sec {
            return Err(ConfigurationError::StepRateExceeded {
                axis: self.axis,
                rate,
                ceiling: max_pulses_per_sec,
            });
        }
        Ok(())
    }

    /// Initialize motors in slot order, register homing, then apply squaring.
    pub fn init(&mut self, homing_mask: &HomingMask) -> Result<(), Fault> {
        for (slot, motor) in self.motors.iter_mut().enumerate() {
            if let Some(m) = motor {
                info!(axis = %axis_letter(self.axis), "  Motor{slot}");
                m.init()?;
            }
        }

        if self.homing.is_some() {
            homing_mask.set_bit(self.axis);
        }

        if self.populated() == 2 && self.motors_with_switches() == 1 {
            debug!(axis = %axis_letter(self.axis), "Squaring: sharing switch across both motors");
            for m in self.motors.iter_mut().flatten() {
                m.make_dual_switches();
            }
        }
        Ok(())
    }

    /// Whether `handle` belongs to one of this axis' motors.
    pub fn has_motor(&self, handle: DriverHandle) -> bool {
        self.motors.iter().flatten().any(|m| m.matches(handle))
    }

    /// Slots 0 and 1 are both populated.
    pub fn has_dual_motor(&self) -> bool {
        self.motors[0].is_some() && self.motors[1].is_some()
    }

    pub fn motors_with_switches(&self) -> usize {
        self.motors.iter().flatten().filter(|m| m.has_switches()).count()
    }

    /// `slot1.pulloff - slot0.pulloff` on a dual-motor axis, else 0.
    ///
    /// Positive when the second motor backs off further.
    pub fn pulloff_offset(&self) -> f64 {
        match (&self.motors[0], &self.motors[1]) {
            (Some(m0), Some(m1)) => m1.pulloff() - m0.pulloff(),
            _ => 0.0,
        }
    }

    /// Number of populated slots.
    pub fn populated(&self) -> usize {
        self.motors.iter().flatten().count()
    }

    pub fn motor(&self, slot: usize) -> Option<&MotorSlot> {
        self.motors.get(slot).and_then(Option::as_ref)
    }

    /// Release every populated slot and the homing configuration.
    ///
    /// Each motor is dropped exactly once; calling again is a no-op.
    pub fn release(&mut self) {
        for (slot, motor) in self.motors.iter_mut().enumerate() {
            if let Some(m) = motor.take() {
                debug!(axis = %axis_letter(self.axis), slot, driver = m.driver_name(), "Motor released");
            }
        }
        self.homing = None;
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.axis
    }

    #[inline]
    pub fn kinematics(&self) -> &AxisKinematics {
        &self.kinematics
    }

    #[inline]
    pub fn steps_per_unit(&self) -> f64 {
        self.kinematics.steps_per_unit
    }

    #[inline]
    pub fn max_rate(&self) -> f64 {
        self.kinematics.max_rate
    }

    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.kinematics.acceleration
    }

    #[inline]
    pub fn max_travel(&self) -> f64 {
        self.kinematics.max_travel
    }

    #[inline]
    pub fn soft_limits(&self) -> bool {
        self.kinematics.soft_limits
    }

    #[inline]
    pub fn backlash(&self) -> f64 {
        self.kinematics.backlash
    }

    #[inline]
    pub fn homing(&self) -> Option<&HomingConfig> {
        self.homing.as_ref()
    }
}
