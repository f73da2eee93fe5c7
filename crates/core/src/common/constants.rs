//! Protocol and Workload Constants.
//!
//! This module defines constants shared with the memory server and the default workload
//! shape. It includes:
//! 1. **Protocol Constants:** Payload width and status codes.
//! 2. **Workload Constants:** Fill stride, probe address and progress intervals.

/// Width of the payload carried by every request and response (one cache line).
pub const LINE_BYTES: usize = 64;

/// Fill value stamped into every byte by the memory initializer.
///
/// After initialization, the first byte of every line drives pointer-chase hops of
/// `STRIDE` lines.
pub const STRIDE: u8 = 7;

/// Status code returned by the peer for a successful operation.
pub const STATUS_OK: u8 = 0;

/// Number of leading READ payload bytes shown by the single-exchange report.
pub const EXCHANGE_HEAD_BYTES: usize = 16;

/// Number of trace lines between progress clock checks during replay.
pub const REPLAY_PROGRESS_LINES: u64 = 1000;

/// Minimum number of seconds between two replay progress messages.
pub const REPLAY_PROGRESS_SECS: u64 = 5;

/// Number of progress messages emitted over a full initialization pass.
pub const INIT_PROGRESS_STEPS: u64 = 16;
