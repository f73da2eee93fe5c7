//! Statistics Tests.

use std::time::Duration;

use cxlbench_core::stats::{LatencyStats, Report, rate_per_second};
use cxlbench_core::workload::InitReport;
use pretty_assertions::assert_eq;

#[test]
fn empty_stats_have_no_mean() {
    let stats = LatencyStats::default();
    assert!(stats.is_empty());
    assert_eq!(stats.mean_ns(), None);
    assert_eq!(stats.min_ns, None);
    assert_eq!(stats.max_ns, None);
}

#[test]
fn record_tracks_total_min_max() {
    let mut stats = LatencyStats::default();
    for ns in [300, 100, 200] {
        stats.record(ns);
    }
    assert_eq!(
        stats,
        LatencyStats {
            count: 3,
            total_ns: 600,
            min_ns: Some(100),
            max_ns: Some(300),
        }
    );
    assert_eq!(stats.mean_ns(), Some(200.0));
}

#[test]
fn total_saturates() {
    let mut stats = LatencyStats::default();
    stats.record(u64::MAX);
    stats.record(10);
    assert_eq!(stats.total_ns, u64::MAX);
    assert_eq!(stats.count, 2);
}

#[test]
fn rate_guards_zero_inputs() {
    assert_eq!(rate_per_second(0, Duration::from_secs(1)), None);
    assert_eq!(rate_per_second(10, Duration::ZERO), None);
    assert_eq!(rate_per_second(500, Duration::from_millis(250)), Some(2000.0));
}

fn sample_report() -> InitReport {
    let mut latency = LatencyStats::default();
    latency.record(90);
    latency.record(110);
    InitReport {
        lines_written: 2,
        fill: 7,
        elapsed: Duration::from_millis(1500),
        latency,
    }
}

#[test]
fn text_report_layout() {
    let mut out = Vec::new();
    sample_report().write_text(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let rule = "=".repeat(58);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "",
            rule.as_str(),
            "MEMORY INITIALIZATION",
            rule.as_str(),
            "init.lines               2",
            "init.fill                7",
            "init.seconds             1.500 s",
            "init.latency.count       2",
            "init.latency.mean        100.00 ns",
            "init.latency.min         90 ns",
            "init.latency.max         110 ns",
            rule.as_str(),
        ]
    );
}

#[test]
fn json_report_is_one_document() {
    let mut out = Vec::new();
    sample_report().write_json(&mut out).unwrap();
    assert!(out.ends_with(b"\n"));

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["lines_written"], 2);
    assert_eq!(value["elapsed"], 1.5);
    assert_eq!(value["latency"]["total_ns"], 200);
    assert_eq!(value["latency"]["min_ns"], 90);
}
