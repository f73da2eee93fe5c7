//! Benchmarking client for a remote CXL memory simulator.
//!
//! This crate drives load/store traffic against a peer-owned, simulated memory region
//! over a connected byte stream. It provides:
//! 1. **Wire:** Fixed-layout request/response records and a blocking transport session.
//! 2. **Workloads:** Memory initialization, pointer chasing, single exchange, latency sweep,
//!    bandwidth and trace replay drivers.
//! 3. **Reporting:** Latency accumulation and text/JSON report rendering.
//! 4. **Configuration:** Address-space geometry, connection and workload parameters.

/// Common types and constants (address space, errors, protocol constants).
pub mod common;
/// Benchmark configuration (defaults, JSON loading, validation).
pub mod config;
/// Status-checked read/write client built on a transport.
pub mod client;
/// Wire codec and transport session.
pub mod net;
/// Latency accumulation and report rendering.
pub mod stats;
/// Workload drivers (initializer, pointer chase, exchange, sweep, replay).
pub mod workload;

/// Root configuration type; use `BenchConfig::default()` or load it from JSON.
pub use crate::config::BenchConfig;
/// Validated simulated address-space geometry.
pub use crate::common::AddressSpace;
/// Blocking transport trait and its stream-backed session.
pub use crate::net::{Session, Transport};
