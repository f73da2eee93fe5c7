//! Sequential latency sweep and bandwidth test.
//!
//! Unlike pointer chasing, these walk the space in address order and fail on the first
//! non-zero status.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::client::MemClient;
use crate::common::addr::AddressSpace;
use crate::common::constants::LINE_BYTES;
use crate::common::error::ClientError;
use crate::net::transport::Transport;
use crate::stats::{self, LatencyStats, Report};

/// Result of a sequential READ latency sweep.
#[derive(Clone, Debug, Serialize)]
pub struct SweepReport {
    /// Server-reported READ latencies.
    pub latency: LatencyStats,
    /// Wall-clock duration of the sweep.
    #[serde(serialize_with = "stats::serialize_secs")]
    pub elapsed: Duration,
}

/// Throughput of one direction of the bandwidth test.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PhaseBandwidth {
    /// Bytes moved.
    pub bytes: u64,
    /// Wall-clock duration of the phase.
    #[serde(serialize_with = "stats::serialize_secs")]
    pub elapsed: Duration,
}

/// Result of the write-then-read bandwidth test.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BandwidthReport {
    /// WRITE phase.
    pub write: PhaseBandwidth,
    /// READ phase.
    pub read: PhaseBandwidth,
}

/// Issues `ops` READs at consecutive lines, wrapping around the space.
///
/// # Errors
///
/// Stops at the first transport failure or non-zero status.
pub fn latency_sweep<T: Transport>(
    client: &mut MemClient<T>,
    space: &AddressSpace,
    ops: u64,
) -> Result<SweepReport, ClientError> {
    info!(ops, "starting latency sweep");
    let mut latency = LatencyStats::default();
    let start = Instant::now();
    for i in 0..ops {
        let addr = space.wrap(i.wrapping_mul(space.line_size()));
        let (_, ns) = client.read(addr)?;
        latency.record(ns);
    }
    Ok(SweepReport {
        latency,
        elapsed: start.elapsed(),
    })
}

/// Writes every line of the space, then reads every line back, timing each phase.
///
/// Every line is written with the bytes `0, 1, .., line_size - 1`.
///
/// # Errors
///
/// Stops at the first transport failure or non-zero status.
pub fn bandwidth<T: Transport>(
    client: &mut MemClient<T>,
    space: &AddressSpace,
) -> Result<BandwidthReport, ClientError> {
    let line = space.line_size() as usize;
    let mut pattern = [0u8; LINE_BYTES];
    for (j, byte) in pattern.iter_mut().enumerate() {
        *byte = (j % 256) as u8;
    }

    info!(bytes = space.size(), "measuring write bandwidth");
    let start = Instant::now();
    for addr in space.line_addrs() {
        let _ = client.write(addr, &pattern[..line])?;
    }
    let write = PhaseBandwidth {
        bytes: space.size(),
        elapsed: start.elapsed(),
    };

    info!(bytes = space.size(), "measuring read bandwidth");
    let start = Instant::now();
    for addr in space.line_addrs() {
        let _ = client.read(addr)?;
    }
    let read = PhaseBandwidth {
        bytes: space.size(),
        elapsed: start.elapsed(),
    };

    Ok(BandwidthReport { write, read })
}

impl PhaseBandwidth {
    /// Returns throughput in GB/s (10^9 bytes), or `None` for a zero-length phase.
    pub fn gb_per_second(&self) -> Option<f64> {
        stats::rate_per_second(self.bytes, self.elapsed).map(|b| b / 1e9)
    }
}

impl Report for SweepReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        stats::write_header(out, "LATENCY SWEEP")?;
        stats::write_latency(out, "sweep.latency", &self.latency)?;
        stats::write_row(
            out,
            "sweep.seconds",
            &format!("{:.3} s", self.elapsed.as_secs_f64()),
        )?;
        stats::write_footer(out)
    }
}

impl Report for BandwidthReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        stats::write_header(out, "BANDWIDTH")?;
        for (name, phase) in [("write", &self.write), ("read", &self.read)] {
            stats::write_row(out, &format!("{name}.bytes"), &phase.bytes.to_string())?;
            stats::write_row(
                out,
                &format!("{name}.seconds"),
                &format!("{:.3} s", phase.elapsed.as_secs_f64()),
            )?;
            stats::write_row(
                out,
                &format!("{name}.bandwidth"),
                &stats::fmt_opt(phase.gb_per_second(), 2, "GB/s"),
            )?;
        }
        stats::write_footer(out)
    }
}
