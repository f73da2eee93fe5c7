//! Pointer-chase latency measurement.
//!
//! Every READ targets the line selected by the first payload byte of the previous response:
//!
//! ```text
//! position' = (position + data[0] * line_size) & (array_size - 1)
//! ```
//!
//! Each request therefore depends on the round trip before it, so neither side can
//! prefetch or pipeline the traversal. On an initialized space every hop is
//! [`STRIDE`](crate::common::STRIDE) lines.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::common::addr::AddressSpace;
use crate::common::error::TransportError;
use crate::net::codec::Request;
use crate::net::transport::{Transport, is_disconnect};
use crate::stats::{self, LatencyStats, Report};

/// Pointer-chase driver configuration.
#[derive(Clone, Copy, Debug)]
pub struct PointerChase {
    space: AddressSpace,
    iterations: u64,
    start: u64,
}

/// Result of a pointer-chase run, complete or stopped early.
#[derive(Debug, Serialize)]
pub struct ChaseReport {
    /// Iterations requested by the configuration.
    pub requested_iterations: u64,
    /// Iterations whose response was fully received.
    pub completed_iterations: u64,
    /// Wall-clock time of the whole loop, measured on a monotonic clock.
    #[serde(serialize_with = "stats::serialize_secs")]
    pub elapsed: Duration,
    /// Server-reported READ latencies of completed iterations.
    pub latency: LatencyStats,
    /// Cursor after the last completed iteration.
    pub final_position: u64,
    /// Transport error that ended the loop early, if any.
    #[serde(serialize_with = "serialize_stop")]
    pub stopped_by: Option<TransportError>,
}

impl PointerChase {
    /// Creates a driver that performs `iterations` dependent READs starting at offset 0.
    pub fn new(space: AddressSpace, iterations: u64) -> Self {
        Self {
            space,
            iterations,
            start: 0,
        }
    }

    /// Sets the starting cursor; it is wrapped and aligned into the space.
    #[must_use]
    pub fn starting_at(mut self, position: u64) -> Self {
        self.start = self.space.align_down(self.space.wrap(position));
        self
    }

    /// Runs the measurement loop.
    ///
    /// A transport failure stops the loop immediately: the failed iteration is not counted,
    /// nothing is retried, and the report carries the counters gathered so far together
    /// with the error.
    pub fn run<T: Transport + ?Sized>(&self, transport: &mut T) -> ChaseReport {
        info!(
            iterations = self.iterations,
            array_size = self.space.size(),
            start = self.start,
            "starting pointer chasing test"
        );

        let mut position = self.start;
        let mut latency = LatencyStats::default();
        let mut completed = 0u64;
        let mut stopped_by = None;

        let start = Instant::now();
        for _ in 0..self.iterations {
            let request = Request::read(position, self.space.line_size());
            match transport.exchange(&request) {
                Ok(response) => {
                    latency.record(response.latency_ns);
                    position = self.space.next_position(position, response.data[0]);
                    completed += 1;
                }
                Err(e) => {
                    if is_disconnect(&e) {
                        warn!(completed, error = %e, "peer disconnected, stopping pointer chase");
                    } else {
                        warn!(completed, error = %e, "transport failed, stopping pointer chase");
                    }
                    stopped_by = Some(e);
                    break;
                }
            }
        }
        let elapsed = start.elapsed();

        info!(completed, elapsed_s = elapsed.as_secs_f64(), "pointer chasing finished");

        ChaseReport {
            requested_iterations: self.iterations,
            completed_iterations: completed,
            elapsed,
            latency,
            final_position: position,
            stopped_by,
        }
    }
}

impl ChaseReport {
    /// Returns `total_latency / completed_iterations`, or `None` if nothing completed.
    pub fn mean_latency_ns(&self) -> Option<f64> {
        self.latency.mean_ns()
    }

    /// Returns completed iterations per second of loop wall time.
    pub fn ops_per_second(&self) -> Option<f64> {
        stats::rate_per_second(self.completed_iterations, self.elapsed)
    }

    /// Returns `true` if every requested iteration completed.
    pub fn is_complete(&self) -> bool {
        self.stopped_by.is_none() && self.completed_iterations == self.requested_iterations
    }
}

impl Report for ChaseReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        stats::write_header(out, "POINTER CHASE RESULTS")?;
        stats::write_row(
            out,
            "chase.iterations",
            &format!("{} / {}", self.completed_iterations, self.requested_iterations),
        )?;
        stats::write_row(
            out,
            "chase.seconds",
            &format!("{:.3} s", self.elapsed.as_secs_f64()),
        )?;
        if self.completed_iterations == 0 {
            stats::write_row(out, "chase.latency", "no completed iterations")?;
        } else {
            stats::write_row(
                out,
                "chase.latency.total",
                &format!("{} ns", self.latency.total_ns),
            )?;
            stats::write_latency(out, "chase.latency", &self.latency)?;
        }
        stats::write_row(
            out,
            "chase.ops_per_sec",
            &stats::fmt_opt(self.ops_per_second(), 2, ""),
        )?;
        stats::write_row(
            out,
            "chase.final_position",
            &format!("{:#x}", self.final_position),
        )?;
        if let Some(err) = &self.stopped_by {
            stats::write_row(out, "chase.stopped_by", &err.to_string())?;
        }
        stats::write_footer(out)
    }
}

fn serialize_stop<S: Serializer>(err: &Option<TransportError>, s: S) -> Result<S::Ok, S::Error> {
    match err {
        Some(e) => s.serialize_some(&e.to_string()),
        None => s.serialize_none(),
    }
}
