//! Motor driver capability and the per-slot motor binding.
//!
//! A `MotorSlot` binds one physical motor driver to one slot of one axis.
//! The driver itself is a trait object supplied by the hardware registry;
//! whether it can report limit switches is a closed choice between
//! [`MotorCapability::Plain`] and [`MotorCapability::SwitchCapable`].

use std::sync::atomic::{AtomicU32, Ordering};

use kestrel_common::error::Fault;

/// Opaque identity of one motor driver instance.
///
/// The real-time layer reports hardware events by handle; `Axes::find_axis_for`
/// maps a handle back to its owning axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverHandle(u32);

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(1);

impl DriverHandle {
    /// Allocate a fresh, process-unique handle.
    pub fn allocate() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

/// Interface implemented by every motor driver backend.
pub trait MotorDriver: Send {
    /// Driver type name (e.g. "stepstick").
    fn name(&self) -> &str;

    /// Configure the driver hardware. May block on bus transactions.
    ///
    /// # Errors
    /// Return `Fault::HardwareInit` if the driver cannot be brought up.
    fn init(&mut self) -> Result<(), Fault>;
}

/// Switch capability of a motor binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCapability {
    /// No limit switch wired to this motor.
    Plain,
    /// At least one limit switch wired to this motor.
    SwitchCapable,
}

/// One populated motor slot of an axis.
pub struct MotorSlot {
    handle: DriverHandle,
    driver: Box<dyn MotorDriver>,
    capability: MotorCapability,
    pulloff: f64,
    /// Starts from `capability`; squaring may force it true.
    has_switches: bool,
}

impl MotorSlot {
    pub fn new(
        handle: DriverHandle,
        driver: Box<dyn MotorDriver>,
        capability: MotorCapability,
        pulloff: f64,
    ) -> Self {
        Self {
            handle,
            driver,
            capability,
            pulloff,
            has_switches: capability == MotorCapability::SwitchCapable,
        }
    }

    /// Delegate to the driver. Failures propagate unchanged.
    pub fn init(&mut self) -> Result<(), Fault> {
        self.driver.init()
    }

    /// Whether this slot reports limit switches (physical or squared).
    #[inline]
    pub fn has_switches(&self) -> bool {
        self.has_switches
    }

    /// Report switches from now on. Idempotent.
    #[inline]
    pub fn make_dual_switches(&mut self) {
        self.has_switches = true;
    }

    /// Identity comparison against the underlying driver.
    #[inline]
    pub fn matches(&self, handle: DriverHandle) -> bool {
        self.handle == handle
    }

    /// Homing pulloff distance (0 when not configured).
    #[inline]
    pub fn pulloff(&self) -> f64 {
        self.pulloff
    }

    #[inline]
    pub fn handle(&self) -> DriverHandle {
        self.handle
    }

    #[inline]
    pub fn capability(&self) -> MotorCapability {
        self.capability
    }

    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }
}

impl std::fmt::Debug for MotorSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotorSlot")
            .field("handle", &self.handle)
            .field("driver", &self.driver.name())
            .field("capability", &self.capability)
            .field("pulloff", &self.pulloff)
            .field("has_switches", &self.has_switches)
            .finish()
    }
}
