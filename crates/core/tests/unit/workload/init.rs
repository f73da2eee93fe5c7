//! Initialization Tests.

use cxlbench_core::common::{STRIDE, TransportError};
use cxlbench_core::net::{OpType, Response};
use cxlbench_core::workload::initialize;

use crate::common::harness::{init_logging, render, reference_space, small_space};
use crate::common::mocks::peer::{MemoryModel, SimulatedPeer};
use crate::common::mocks::transport::{MockTransport, broken_pipe};

#[test]
fn every_line_holds_the_stride() {
    init_logging();
    let space = reference_space();
    let mut peer = SimulatedPeer::new(MemoryModel::new(space.size() as usize));

    let report = initialize(&mut peer, &space, STRIDE).unwrap();

    assert_eq!(report.lines_written, 16384);
    assert_eq!(report.latency.count, 16384);
    for addr in space.line_addrs() {
        assert_eq!(peer.model.peek(addr), [STRIDE; 64], "line {addr:#x}");
    }
}

#[test]
fn writes_are_ascending_full_lines() {
    let space = small_space();
    let mut peer = SimulatedPeer::new(MemoryModel::new(4096));
    let _ = initialize(&mut peer, &space, 3).unwrap();

    let log = &peer.model.log;
    assert_eq!(log.len(), 64);
    assert!(log.iter().all(|r| r.op == OpType::Write && r.size == 64));
    assert!(log.iter().all(|r| r.timestamp == 0 && r.data == [3; 64]));
    let addrs = peer.model.addrs_of(OpType::Write);
    assert_eq!(addrs, space.line_addrs().collect::<Vec<_>>());
}

#[test]
fn non_zero_status_does_not_abort() {
    let space = small_space();
    let mut peer = SimulatedPeer::new(MemoryModel::new(4096).with_fault(0x40));
    let report = initialize(&mut peer, &space, STRIDE).unwrap();
    assert_eq!(report.lines_written, 64);
}

#[test]
fn transport_error_aborts_without_report() {
    let space = small_space();
    let mut mock = MockTransport::new();
    mock.expect_send_request().times(3).returning(|_| Ok(()));
    let mut answered = 0;
    mock.expect_receive_response().times(3).returning(move || {
        answered += 1;
        if answered < 3 {
            Ok(Response {
                status: 0,
                latency_ns: 10,
                data: [0; 64],
            })
        } else {
            Err(TransportError::Closed {
                received: 0,
                expected: 80,
            })
        }
    });

    let err = initialize(&mut mock, &space, STRIDE).unwrap_err();
    assert!(matches!(err, TransportError::Closed { .. }));
}

#[test]
fn send_failure_aborts_immediately() {
    let space = small_space();
    let mut mock = MockTransport::new();
    mock.expect_send_request()
        .times(1)
        .returning(|_| Err(broken_pipe()));
    mock.expect_receive_response().never();

    assert!(initialize(&mut mock, &space, STRIDE).is_err());
}

#[test]
fn report_renders_line_count() {
    let space = small_space();
    let mut peer = SimulatedPeer::new(MemoryModel::new(4096).with_latency(50));
    let report = initialize(&mut peer, &space, STRIDE).unwrap();
    let text = render(&report);
    assert!(text.contains("MEMORY INITIALIZATION"));
    assert!(text.contains("init.lines"));
    assert!(text.contains("64"));
    assert_eq!(report.latency.mean_ns(), Some(50.0));
}
