//! Kestrel Common Library
//!
//! Shared constants, machine state, configuration schema and the fault
//! taxonomy used by every kestrel crate.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide capacity limits and defaults
//! - [`config`] - TOML configuration loading trait and errors
//! - [`error`] - Fatal fault taxonomy (configuration, hardware init, runtime)
//! - [`machine`] - Machine state, axis masks and the machine configuration schema
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use kestrel_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod machine;
pub mod prelude;
