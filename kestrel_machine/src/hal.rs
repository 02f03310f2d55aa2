//! Hardware subsystem traits.
//!
//! - `Subsystem` - any optional bus, device or service brought up once at boot
//! - `SteppingEngine` - the mandatory step pulse generator
//! - `ControlChannel` - the command transport (station, then pairing fallback)
//!
//! Backends are created by the [`HardwareRegistry`](crate::registry::HardwareRegistry)
//! from configuration sections and owned by [`Machine`](crate::machine::Machine).

use kestrel_common::error::Fault;

/// One optional subsystem (bus, pin extender, planner, probe, ...).
pub trait Subsystem: Send {
    /// Section name this instance was created for.
    fn name(&self) -> &str;

    /// Bring the subsystem up. Called at most once per boot.
    ///
    /// # Errors
    /// Return `Fault::HardwareInit` on failure.
    fn init(&mut self) -> Result<(), Fault>;
}

/// Step pulse generator shared by every axis.
pub trait SteppingEngine: Send {
    fn name(&self) -> &str;

    /// Bring the engine up.
    fn init(&mut self) -> Result<(), Fault>;

    /// Pulse rate ceiling used to validate every axis [pulses/s].
    fn max_pulses_per_sec(&self) -> u32;

    /// Overwrite the step counter of `axis`.
    fn set_motor_steps(&mut self, axis: usize, steps: i32);

    fn motor_steps(&self, axis: usize) -> i32;

    /// Stop pulse output and flush queued segments.
    fn reset(&mut self) -> Result<(), Fault>;
}

/// Outcome of control channel setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Joined the configured network.
    Station,
    /// Station failed; advertising for pairing.
    Pairing,
    /// Neither transport came up.
    Offline,
}

/// Command transport brought up at the end of boot, whatever the state.
pub trait ControlChannel {
    /// Try station mode. Returns whether the link is up.
    fn begin_station(&mut self) -> bool;

    /// Fallback pairing mode. Returns whether advertising started.
    fn begin_pairing(&mut self) -> bool;
}

/// Station first, pairing as fallback.
pub fn bring_up_channel(channel: &mut dyn ControlChannel) -> ChannelMode {
    if channel.begin_station() {
        ChannelMode::Station
    } else if channel.begin_pairing() {
        ChannelMode::Pairing
    } else {
        ChannelMode::Offline
    }
}
