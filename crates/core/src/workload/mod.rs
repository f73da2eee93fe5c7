//! Workload drivers.
//!
//! Every driver owns nothing but its counters and talks to the peer through a
//! [`Transport`](crate::net::Transport), one exchange at a time. This module provides:
//! 1. **Initializer:** Stamps every line with the stride fill value.
//! 2. **Pointer Chase:** Dependent READs whose next address comes from the previous reply.
//! 3. **Exchange:** One WRITE and one READ at a fixed address.
//! 4. **Sweep:** Sequential latency sweep and read/write bandwidth.
//! 5. **Replay:** Address traces replayed against the peer.

/// Pointer-chase measurement loop.
pub mod chase;
/// Single WRITE/READ round trip.
pub mod exchange;
/// Stride fill of the whole address space.
pub mod init;
/// Address-trace replay.
pub mod replay;
/// Sequential latency sweep and bandwidth test.
pub mod sweep;

pub use chase::{ChaseReport, PointerChase};
pub use exchange::{ExchangeReport, single_exchange};
pub use init::{InitReport, initialize};
pub use replay::{ReplayReport, TraceRecord, parse_trace_line, replay};
pub use sweep::{BandwidthReport, SweepReport, bandwidth, latency_sweep};
