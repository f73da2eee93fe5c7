//! Latency statistics and report rendering.
//!
//! This module tracks measurement counters for the workload drivers. It provides:
//! 1. **Latency:** Count, total, minimum and maximum of server-reported latencies.
//! 2. **Derived metrics:** Mean latency and rates, guarded against empty runs.
//! 3. **Rendering:** The [`Report`] trait for text output to a caller-owned sink, plus
//!    JSON through `serde`.

use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;

/// Width of the rule lines framing a text report.
const RULE_WIDTH: usize = 58;

/// Running latency counters.
///
/// Counters start at zero and are only ever accumulated; a driver finalizes them once at
/// the end of its loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LatencyStats {
    /// Number of recorded operations.
    pub count: u64,
    /// Sum of recorded latencies in nanoseconds.
    pub total_ns: u64,
    /// Smallest recorded latency, if any.
    pub min_ns: Option<u64>,
    /// Largest recorded latency, if any.
    pub max_ns: Option<u64>,
}

impl LatencyStats {
    /// Records one operation's latency.
    pub fn record(&mut self, latency_ns: u64) {
        self.count += 1;
        self.total_ns = self.total_ns.saturating_add(latency_ns);
        self.min_ns = Some(self.min_ns.map_or(latency_ns, |m| m.min(latency_ns)));
        self.max_ns = Some(self.max_ns.map_or(latency_ns, |m| m.max(latency_ns)));
    }

    /// Returns the mean latency, or `None` if nothing was recorded.
    pub fn mean_ns(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.total_ns as f64 / self.count as f64)
        }
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Returns `count / elapsed`, or `None` when either is zero.
pub fn rate_per_second(count: u64, elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    if count == 0 || secs <= 0.0 {
        None
    } else {
        Some(count as f64 / secs)
    }
}

/// A workload result that can be rendered for humans or serialized for machines.
pub trait Report: Serialize {
    /// Writes the human-readable report to `out`.
    ///
    /// # Errors
    ///
    /// Propagates any error from the sink.
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Writes the report as a single pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Propagates serialization or sink errors as [`io::Error`].
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self).map_err(io::Error::other)?;
        writeln!(out)
    }
}

/// Writes a framed section title.
pub(crate) fn write_header(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

/// Writes a closing rule.
pub(crate) fn write_footer(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

/// Writes a `label value` row with a fixed label column.
pub(crate) fn write_row(out: &mut dyn Write, label: &str, value: &str) -> io::Result<()> {
    writeln!(out, "{label:<25}{value}")
}

/// Formats an optional float with `precision` decimals and a unit, or `n/a`.
pub(crate) fn fmt_opt(value: Option<f64>, precision: usize, unit: &str) -> String {
    value.map_or_else(
        || "n/a".to_string(),
        |v| {
            if unit.is_empty() {
                format!("{v:.precision$}")
            } else {
                format!("{v:.precision$} {unit}")
            }
        },
    )
}

/// Writes the latency rows shared by every report.
pub(crate) fn write_latency(out: &mut dyn Write, prefix: &str, stats: &LatencyStats) -> io::Result<()> {
    write_row(out, &format!("{prefix}.count"), &stats.count.to_string())?;
    write_row(
        out,
        &format!("{prefix}.mean"),
        &fmt_opt(stats.mean_ns(), 2, "ns"),
    )?;
    write_row(
        out,
        &format!("{prefix}.min"),
        &stats.min_ns.map_or_else(|| "n/a".to_string(), |v| format!("{v} ns")),
    )?;
    write_row(
        out,
        &format!("{prefix}.max"),
        &stats.max_ns.map_or_else(|| "n/a".to_string(), |v| format!("{v} ns")),
    )
}

/// Serializes a [`Duration`] as fractional seconds.
pub(crate) fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}
