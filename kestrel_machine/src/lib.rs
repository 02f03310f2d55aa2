//! # Kestrel Machine Library
//!
//! Axis/motor ownership, ordered hardware bring-up and fault containment for
//! a multi-axis motion controller.
//!
//! ## Flow
//!
//! 1. [`bootstrap::Bootstrap`] loads the configuration once, brings every
//!    configured subsystem up in dependency order and decides the initial
//!    [`MachineState`](kestrel_common::machine::state::MachineState).
//! 2. [`recovery::Supervisor`] then drives the command processor forever,
//!    catching fatal faults at one boundary and freezing the controller after
//!    repeated non-user failures.
//!
//! ## Ownership
//!
//! [`machine::Machine`] owns every subsystem. Each [`axis::AxisGroup`] owns
//! its [`motor::MotorSlot`]s. Shared state ([`system::SystemState`]) is
//! passed by reference; every field has a single writer.
//!
//! ```text
//!  ConfigSource ──load──► Machine ──► Bootstrap ──► Supervisor ──► CommandProcessor
//!                           │             │              │
//!                           ▼             ▼              ▼
//!                    Axes/AxisGroup   SystemState    SystemState
//!                    MotorSlot        (HomingMask)   (ConfigAlarm)
//! ```

pub mod axes;
pub mod axis;
pub mod bootstrap;
pub mod drivers;
pub mod hal;
pub mod homing;
pub mod loader;
pub mod machine;
pub mod motor;
pub mod recovery;
pub mod registry;
pub mod spindle;
pub mod startup_log;
pub mod system;

pub use crate::bootstrap::{BootReport, Bootstrap};
pub use crate::machine::Machine;
pub use crate::recovery::{CommandProcessor, ProtocolExit, Supervisor};
pub use crate::registry::HardwareRegistry;
pub use crate::system::SystemState;
