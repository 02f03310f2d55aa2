//! Collection of configured axes in index order.

use heapless::Vec;
use tracing::info;

use kestrel_common::consts::MAX_AXES;
use kestrel_common::error::{ConfigurationError, Fault};
use kestrel_common::machine::axis::axis_letter;
use kestrel_common::machine::config::AxesConfig;

use crate::axis::AxisGroup;
use crate::homing::HomingMask;
use crate::motor::DriverHandle;
use crate::registry::HardwareRegistry;

/// Owns every configured `AxisGroup`, ascending by axis index.
#[derive(Debug, Default)]
pub struct Axes {
    groups: Vec<AxisGroup, MAX_AXES>,
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure every axis section and validate it against `max_pulses_per_sec`.
    pub fn from_config(
        cfg: &AxesConfig,
        registry: &HardwareRegistry,
        max_pulses_per_sec: u32,
    ) -> Result<Self, ConfigurationError> {
        let mut axes = Self::new();
        for (idx, axis_cfg) in cfg.iter() {
            let group = AxisGroup::configure(idx, axis_cfg, registry)?;
            group.validate(max_pulses_per_sec)?;
            axes.push(group)?;
        }
        Ok(axes)
    }

    /// Append a group. Groups must arrive in ascending index order.
    pub fn push(&mut self, group: AxisGroup) -> Result<(), ConfigurationError> {
        if let Some(last) = self.groups.last() {
            if last.index() >= group.index() {
                return Err(ConfigurationError::InvalidOption {
                    section: "axes".into(),
                    reason: format!(
                        "axis {} added after axis {}",
                        axis_letter(group.index()),
                        axis_letter(last.index())
                    ),
                });
            }
        }
        self.groups.push(group).map_err(|g| ConfigurationError::InvalidOption {
            section: "axes".into(),
            reason: format!("axis {} exceeds the {MAX_AXES} axis limit", g.index()),
        })
    }

    /// Initialize every axis in index order. Stops at the first failure.
    pub fn init(&mut self, homing_mask: &HomingMask) -> Result<(), Fault> {
        info!(count = self.groups.len(), "Axis count {}", self.number_axis());
        for group in self.groups.iter_mut() {
            info!("Axis {}", axis_letter(group.index()));
            group.init(homing_mask)?;
        }
        Ok(())
    }

    /// Highest configured axis index + 1.
    pub fn number_axis(&self) -> usize {
        self.groups.last().map_or(0, |g| g.index() + 1)
    }

    pub fn get(&self, axis: usize) -> Option<&AxisGroup> {
        self.groups.iter().find(|g| g.index() == axis)
    }

    pub fn get_mut(&mut self, axis: usize) -> Option<&mut AxisGroup> {
        self.groups.iter_mut().find(|g| g.index() == axis)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxisGroup> {
        self.groups.iter()
    }

    /// Index of the axis owning the motor behind `handle`.
    pub fn find_axis_for(&self, handle: DriverHandle) -> Option<usize> {
        self.groups.iter().find(|g| g.has_motor(handle)).map(AxisGroup::index)
    }

    /// Release every group. Idempotent.
    pub fn release(&mut self) {
        for group in self.groups.iter_mut() {
            group.release();
        }
    }

    /// Number of configured axes (not `number_axis`).
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
