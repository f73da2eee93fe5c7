//! Common types and constants shared by every component of the benchmark client.
//!
//! This module provides:
//! 1. **Address Space:** The validated geometry of the peer-owned memory region.
//! 2. **Constants:** Protocol and workload constants (line size, stride, defaults).
//! 3. **Error Handling:** Setup, transport, codec, config and client error types.

/// Simulated address-space geometry and line iteration.
pub mod addr;

/// Protocol and workload constants.
pub mod constants;

/// Error types for every failure class.
pub mod error;

pub use addr::AddressSpace;
pub use constants::{LINE_BYTES, STRIDE};
pub use error::{BenchError, ClientError, CodecError, ConfigError, SetupError, TransportError};
