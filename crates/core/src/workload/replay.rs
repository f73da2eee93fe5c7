//! Address-trace replay.
//!
//! Replays a recorded memory trace against the peer, one line per operation. A trace line
//! is four whitespace-separated fields:
//!
//! ```text
//! <timestamp> <addr> <size> <op>
//! 1000 0x7f001040 64 R
//! 1010 4096 8 write
//! ```
//!
//! `addr` is hexadecimal when it contains `0x`, decimal otherwise. `op` is a WRITE for
//! `w`, `write` or `1` (any case) and a READ for anything else. Extra fields are ignored.

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::client::MemClient;
use crate::common::addr::AddressSpace;
use crate::common::constants::{LINE_BYTES, REPLAY_PROGRESS_LINES, REPLAY_PROGRESS_SECS};
use crate::common::error::ClientError;
use crate::net::codec::OpType;
use crate::net::transport::Transport;
use crate::stats::{self, LatencyStats, Report};

/// One parsed trace entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Timestamp recorded in the trace; carried but not used for pacing.
    pub timestamp: u64,
    /// Raw trace address before alignment and wrapping.
    pub addr: u64,
    /// Access size in bytes.
    pub size: u64,
    /// Operation kind.
    pub op: OpType,
}

/// Counters of a replay, complete or stopped by a transport failure.
#[derive(Debug, Default, Serialize)]
pub struct ReplayReport {
    /// Trace lines read, including skipped ones.
    pub lines: u64,
    /// Lines that could not be parsed.
    pub skipped: u64,
    /// Operations the peer answered with a non-zero status.
    pub failed: u64,
    /// READ latencies of successful operations.
    pub reads: LatencyStats,
    /// WRITE latencies of successful operations.
    pub writes: LatencyStats,
    /// Bytes moved by successful operations.
    pub total_bytes: u64,
    /// Wall-clock duration of the replay.
    #[serde(serialize_with = "stats::serialize_secs")]
    pub elapsed: Duration,
    /// Reason the replay ended early, if it did.
    pub stopped_by: Option<String>,
}

/// Parses one trace line, returning `None` for malformed or short lines.
pub fn parse_trace_line(line: &str) -> Option<TraceRecord> {
    let mut fields = line.split_whitespace();
    let timestamp = fields.next()?.parse().ok()?;
    let addr_field = fields.next()?;
    let size = fields.next()?.parse().ok()?;
    let op_field = fields.next()?;

    let addr = if addr_field.contains("0x") {
        let digits = addr_field.trim_start_matches("0x").trim_start_matches("0X");
        u64::from_str_radix(digits, 16).ok()?
    } else {
        addr_field.parse().ok()?
    };

    let op = match op_field.to_ascii_lowercase().as_str() {
        "w" | "write" | "1" => OpType::Write,
        _ => OpType::Read,
    };

    Some(TraceRecord {
        timestamp,
        addr,
        size,
        op,
    })
}

/// Replays every line of `trace` through `client`.
///
/// Addresses are aligned down to a line and wrapped into `space`; sizes are clamped to
/// the line size and WRITEs carry a zero payload. Lines that do not parse, including
/// lines that are not valid UTF-8, are counted as skipped. A non-zero status is counted
/// and the replay continues. A transport failure, or an error reading the trace, ends
/// the replay and is recorded in the report; nothing is retried.
pub fn replay<T: Transport, R: BufRead>(
    client: &mut MemClient<T>,
    space: &AddressSpace,
    trace: R,
) -> ReplayReport {
    let mut report = ReplayReport::default();
    let zeros = [0u8; LINE_BYTES];
    let start = Instant::now();
    let mut last_progress = start;

    for raw in trace.split(b'\n') {
        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to read trace");
                report.stopped_by = Some(format!("trace read failed: {e}"));
                break;
            }
        };
        report.lines += 1;

        if report.lines % REPLAY_PROGRESS_LINES == 0
            && last_progress.elapsed() >= Duration::from_secs(REPLAY_PROGRESS_SECS)
        {
            info!(lines = report.lines, "replay progress");
            last_progress = Instant::now();
        }

        // Lines that are not UTF-8 are malformed, not fatal.
        let Some(record) = std::str::from_utf8(&raw).ok().and_then(parse_trace_line) else {
            report.skipped += 1;
            continue;
        };

        let addr = space.align_down(space.wrap(record.addr));
        let size = record.size.min(space.line_size());
        let result = match record.op {
            OpType::Read => client.read_sized(addr, size).map(|(_, ns)| ns),
            OpType::Write => client.write(addr, &zeros[..size as usize]),
        };

        match result {
            Ok(ns) => {
                match record.op {
                    OpType::Read => report.reads.record(ns),
                    OpType::Write => report.writes.record(ns),
                }
                report.total_bytes += size;
            }
            Err(ClientError::Transport(e)) => {
                warn!(line = report.lines, error = %e, "transport failed, stopping replay");
                report.stopped_by = Some(e.to_string());
                break;
            }
            Err(e) => {
                warn!(line = report.lines, error = %e, "operation failed");
                report.failed += 1;
            }
        }
    }

    report.elapsed = start.elapsed();
    report
}

impl ReplayReport {
    /// Returns the number of successful operations.
    pub fn operations(&self) -> u64 {
        self.reads.count + self.writes.count
    }

    /// Returns trace lines processed per second.
    pub fn lines_per_second(&self) -> Option<f64> {
        stats::rate_per_second(self.lines, self.elapsed)
    }

    /// Returns successful payload bytes per second in MB/s (10^6 bytes).
    pub fn mb_per_second(&self) -> Option<f64> {
        stats::rate_per_second(self.total_bytes, self.elapsed).map(|b| b / 1e6)
    }
}

impl Report for ReplayReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        stats::write_header(out, "TRACE REPLAY")?;
        stats::write_row(
            out,
            "replay.seconds",
            &format!("{:.2} s", self.elapsed.as_secs_f64()),
        )?;
        stats::write_row(
            out,
            "replay.lines",
            &format!(
                "{} ({} ops/sec)",
                self.lines,
                stats::fmt_opt(self.lines_per_second(), 2, "")
            ),
        )?;
        stats::write_row(out, "replay.skipped", &self.skipped.to_string())?;
        stats::write_row(out, "replay.failed", &self.failed.to_string())?;
        stats::write_row(
            out,
            "replay.bytes",
            &format!(
                "{:.2} MB ({})",
                self.total_bytes as f64 / 1e6,
                stats::fmt_opt(self.mb_per_second(), 2, "MB/sec")
            ),
        )?;
        if !self.reads.is_empty() {
            stats::write_latency(out, "read.latency", &self.reads)?;
        }
        if !self.writes.is_empty() {
            stats::write_latency(out, "write.latency", &self.writes)?;
        }
        if let Some(reason) = &self.stopped_by {
            stats::write_row(out, "replay.stopped_by", reason)?;
        }
        stats::write_footer(out)
    }
}
