//! Configuration for the benchmark client.
//!
//! This module defines every tunable of a run. It provides:
//! 1. **Defaults:** The reference workload (1 MiB space, 64-byte lines, stride 7,
//!    1000 iterations, peer at `127.0.0.1:9999`).
//! 2. **Structures:** Connection, memory geometry and workload sections.
//! 3. **Loading:** JSON documents where every section and field is optional.
//!
//! Use `BenchConfig::default()` for the reference run or [`BenchConfig::load`] for a file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::addr::AddressSpace;
use crate::common::error::ConfigError;

/// Default configuration constants.
mod defaults {
    /// Peer host (loopback).
    pub const HOST: &str = "127.0.0.1";

    /// Peer TCP port.
    pub const PORT: u16 = 9999;

    /// Size of the simulated region (1 MiB).
    ///
    /// Must be a power of two: pointer-chase wraparound is a bitmask.
    pub const ARRAY_SIZE: u64 = 1024 * 1024;

    /// Access granularity in bytes.
    pub const LINE_SIZE: u64 = 64;

    /// Fill value written by the initializer.
    pub const STRIDE: u8 = crate::common::constants::STRIDE;

    /// Pointer-chase iterations.
    pub const ITERATIONS: u64 = 1000;

    /// Address used by the single-exchange test.
    pub const PROBE_ADDR: u64 = 0x1000;

    /// READs issued by the latency sweep.
    pub const SWEEP_OPS: u64 = 1000;
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use cxlbench_core::config::BenchConfig;
///
/// let json = r#"{
///     "connection": { "port": 7000 },
///     "memory": { "array_size": 8192 },
///     "workload": { "iterations": 10 }
/// }"#;
///
/// let config = BenchConfig::from_json_str(json).unwrap();
/// assert_eq!(config.connection.host, "127.0.0.1");
/// assert_eq!(config.connection.port, 7000);
/// assert_eq!(config.memory.array_size, 8192);
/// assert_eq!(config.memory.stride, 7);
/// assert_eq!(config.workload.iterations, 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    /// Peer address and socket options
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Simulated address-space geometry
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Workload sizes and addresses
    #[serde(default)]
    pub workload: WorkloadConfig,
}

/// Peer address and socket options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Peer host name or IP address
    #[serde(default = "ConnectionConfig::default_host")]
    pub host: String,

    /// Peer TCP port
    #[serde(default = "ConnectionConfig::default_port")]
    pub port: u16,

    /// Disable Nagle's algorithm on the socket
    #[serde(default)]
    pub nodelay: bool,
}

impl ConnectionConfig {
    fn default_host() -> String {
        defaults::HOST.to_string()
    }

    fn default_port() -> u16 {
        defaults::PORT
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            nodelay: false,
        }
    }
}

/// Simulated address-space geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Region size in bytes (power of two)
    #[serde(default = "MemoryConfig::default_array_size")]
    pub array_size: u64,

    /// Line size in bytes (power of two, at most 64)
    #[serde(default = "MemoryConfig::default_line_size")]
    pub line_size: u64,

    /// Byte stamped into every line by the initializer
    #[serde(default = "MemoryConfig::default_stride")]
    pub stride: u8,
}

impl MemoryConfig {
    fn default_array_size() -> u64 {
        defaults::ARRAY_SIZE
    }

    fn default_line_size() -> u64 {
        defaults::LINE_SIZE
    }

    fn default_stride() -> u8 {
        defaults::STRIDE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            array_size: defaults::ARRAY_SIZE,
            line_size: defaults::LINE_SIZE,
            stride: defaults::STRIDE,
        }
    }
}

/// Workload sizes and addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadConfig {
    /// Pointer-chase iterations
    #[serde(default = "WorkloadConfig::default_iterations")]
    pub iterations: u64,

    /// Initial pointer-chase cursor (line-aligned, inside the region)
    #[serde(default)]
    pub start_position: u64,

    /// Address of the single-exchange test (line-aligned, inside the region)
    #[serde(default = "WorkloadConfig::default_probe_addr")]
    pub probe_addr: u64,

    /// READs issued by the latency sweep
    #[serde(default = "WorkloadConfig::default_sweep_ops")]
    pub sweep_ops: u64,
}

impl WorkloadConfig {
    fn default_iterations() -> u64 {
        defaults::ITERATIONS
    }

    fn default_probe_addr() -> u64 {
        defaults::PROBE_ADDR
    }

    fn default_sweep_ops() -> u64 {
        defaults::SWEEP_OPS
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::ITERATIONS,
            start_position: 0,
            probe_addr: defaults::PROBE_ADDR,
            sweep_ops: defaults::SWEEP_OPS,
        }
    }
}

impl BenchConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ConfigError::Geometry`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`BenchConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Builds the validated address space described by the memory section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Geometry`] for an invalid geometry.
    pub fn address_space(&self) -> Result<AddressSpace, ConfigError> {
        AddressSpace::new(self.memory.array_size, self.memory.line_size)
    }

    /// Checks geometry and that workload addresses are line-aligned offsets in the region.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Geometry`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let space = self.address_space()?;
        for (name, addr) in [
            ("start_position", self.workload.start_position),
            ("probe_addr", self.workload.probe_addr),
        ] {
            if !space.is_line_addr(addr) {
                return Err(ConfigError::Geometry(format!(
                    "{name} {addr:#x} is not a line-aligned offset below {:#x}",
                    space.size()
                )));
            }
        }
        Ok(())
    }
}
