//! Configuration sources for the bootstrap sequence.

use std::path::{Path, PathBuf};

use tracing::info;

use kestrel_common::config::ConfigLoader;
use kestrel_common::error::Fault;
use kestrel_common::machine::config::MachineConfig;

use crate::machine::Machine;
use crate::registry::HardwareRegistry;

/// Produces a fully configured (validated, not initialized) `Machine`.
pub trait ConfigSource {
    /// Load and assemble the machine.
    ///
    /// # Errors
    /// Any error means the machine stays unconfigured for this boot.
    fn load(&mut self) -> Result<Machine, Fault>;
}

enum Origin {
    File(PathBuf),
    Inline(String),
}

/// TOML configuration resolved through a `HardwareRegistry`.
pub struct TomlConfigSource<'r> {
    origin: Origin,
    registry: &'r HardwareRegistry,
}

impl<'r> TomlConfigSource<'r> {
    /// Read the configuration from a file at load time.
    pub fn from_path(path: impl AsRef<Path>, registry: &'r HardwareRegistry) -> Self {
        Self {
            origin: Origin::File(path.as_ref().to_path_buf()),
            registry,
        }
    }

    /// Use an in-memory TOML document.
    pub fn inline(toml: impl Into<String>, registry: &'r HardwareRegistry) -> Self {
        Self {
            origin: Origin::Inline(toml.into()),
            registry,
        }
    }
}

impl ConfigSource for TomlConfigSource<'_> {
    fn load(&mut self) -> Result<Machine, Fault> {
        let cfg = match &self.origin {
            Origin::File(path) => {
                info!("Configuration file: {}", path.display());
                MachineConfig::load(path)?
            }
            Origin::Inline(text) => MachineConfig::from_toml(text)?,
        };
        Machine::build(&cfg, self.registry)
    }
}
