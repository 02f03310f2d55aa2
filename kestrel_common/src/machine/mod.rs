//! Machine-level shared types.
//!
//! Organized by domain: machine state, axis identification and masks,
//! homing configuration, and the machine configuration schema.

pub mod axis;
pub mod config;
pub mod homing;
pub mod state;
