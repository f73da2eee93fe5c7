//! Memory initialization.
//!
//! Walks the address space one line at a time and WRITEs a payload filled with a constant
//! byte, so that the first READ of every line is deterministic.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::common::addr::AddressSpace;
use crate::common::constants::{INIT_PROGRESS_STEPS, LINE_BYTES};
use crate::common::error::TransportError;
use crate::net::codec::Request;
use crate::net::transport::Transport;
use crate::stats::{self, LatencyStats, Report};

/// Outcome of a completed initialization pass.
#[derive(Clone, Debug, Serialize)]
pub struct InitReport {
    /// Number of lines written (always every line of the space).
    pub lines_written: u64,
    /// Fill value stamped into every byte.
    pub fill: u8,
    /// Wall-clock duration of the pass.
    #[serde(serialize_with = "stats::serialize_secs")]
    pub elapsed: Duration,
    /// Server-reported WRITE latencies.
    pub latency: LatencyStats,
}

/// Writes `fill` into every byte of every line of `space`, strictly in order.
///
/// Each WRITE waits for its response before the next is sent. Response status is not
/// inspected; non-zero statuses are only logged.
///
/// # Errors
///
/// The first transport error aborts the pass; there is no partial-initialization result.
pub fn initialize<T: Transport + ?Sized>(
    transport: &mut T,
    space: &AddressSpace,
    fill: u8,
) -> Result<InitReport, TransportError> {
    info!(
        lines = space.lines(),
        line_size = space.line_size(),
        fill,
        "initializing memory with stride pattern"
    );

    let payload = [fill; LINE_BYTES];
    let progress_every = (space.lines() / INIT_PROGRESS_STEPS).max(1);
    let mut latency = LatencyStats::default();
    let mut lines_written = 0u64;
    let start = Instant::now();

    for addr in space.line_addrs() {
        let request = Request::write(addr, space.line_size(), payload);
        let response = transport.exchange(&request)?;
        if !response.is_ok() {
            warn!(addr, status = response.status, "initialization write returned non-zero status");
        }
        latency.record(response.latency_ns);
        lines_written += 1;

        if lines_written % progress_every == 0 {
            debug!(lines_written, total = space.lines(), "initialization progress");
        }
    }

    let elapsed = start.elapsed();
    info!(lines_written, elapsed_s = elapsed.as_secs_f64(), "initialization complete");

    Ok(InitReport {
        lines_written,
        fill,
        elapsed,
        latency,
    })
}

impl Report for InitReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        stats::write_header(out, "MEMORY INITIALIZATION")?;
        stats::write_row(out, "init.lines", &self.lines_written.to_string())?;
        stats::write_row(out, "init.fill", &self.fill.to_string())?;
        stats::write_row(
            out,
            "init.seconds",
            &format!("{:.3} s", self.elapsed.as_secs_f64()),
        )?;
        stats::write_latency(out, "init.latency", &self.latency)?;
        stats::write_footer(out)
    }
}
