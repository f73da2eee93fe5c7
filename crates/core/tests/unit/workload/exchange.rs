//! Single Exchange Tests.

use cxlbench_core::net::{OpType, Response};
use cxlbench_core::workload::exchange::ascending_pattern;
use cxlbench_core::workload::single_exchange;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::harness::{render, small_space};
use crate::common::mocks::peer::{MemoryModel, SimulatedPeer};
use crate::common::mocks::transport::{MockTransport, broken_pipe};

#[test]
fn reads_back_ascending_pattern() {
    let mut peer = SimulatedPeer::new(MemoryModel::new(8192));
    let report = single_exchange(&mut peer, 0x1000, 64).unwrap();

    assert!(report.round_trip_matches());
    let expected: Vec<u8> = (0u8..16).collect();
    assert_eq!(report.read_head().to_vec(), expected);
    assert_eq!(peer.model.peek(0x1000), ascending_pattern());
}

#[test]
fn read_reuses_the_write_request() {
    let mut peer = SimulatedPeer::new(MemoryModel::new(8192));
    let _ = single_exchange(&mut peer, 0x1000, 64).unwrap();

    let log = &peer.model.log;
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].op, OpType::Write);
    assert_eq!(log[1].op, OpType::Read);
    assert_eq!(log[0].addr, log[1].addr);
    assert_eq!(log[0].size, log[1].size);
    assert_eq!(log[0].data, log[1].data);
}

#[test]
fn text_output_matches_expected_format() {
    let mut peer = SimulatedPeer::new(MemoryModel::new(8192).with_latency(150));
    let report = single_exchange(&mut peer, 0x1000, 64).unwrap();
    let text = render(&report);

    assert!(text.contains("SINGLE EXCHANGE AT 0x1000"));
    assert!(text.contains("Write completed with status 0, latency 150 ns"));
    assert!(text.contains("Read completed with status 0, latency 150 ns"));
    assert!(text.contains("Read data: 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f ..."));
}

#[test]
fn failed_status_is_reported_not_raised() {
    let mut peer = SimulatedPeer::new(MemoryModel::new(8192).with_fault(0x1000));
    let report = single_exchange(&mut peer, 0x1000, 64).unwrap();
    assert_eq!(report.write.status, 1);
    assert_eq!(report.read.status, 1);
    assert!(!report.round_trip_matches());

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["write_status"], 1);
    assert_eq!(value["round_trip_matches"], false);
}

#[test]
fn transport_error_aborts_before_read() {
    let mut mock = MockTransport::new();
    mock.expect_send_request()
        .times(1)
        .returning(|_| Err(broken_pipe()));
    mock.expect_receive_response().never();
    assert!(single_exchange(&mut mock, 0x1000, 64).is_err());
}

#[test]
fn read_response_is_reported_verbatim() {
    let mut mock = MockTransport::new();
    mock.expect_send_request().times(2).returning(|_| Ok(()));
    let mut answered = 0u8;
    mock.expect_receive_response().times(2).returning(move || {
        answered += 1;
        Ok(Response {
            status: 0,
            latency_ns: u64::from(answered) * 10,
            data: [0xEE; 64],
        })
    });

    let report = single_exchange(&mut mock, 0x40, 64).unwrap();
    assert_eq!(report.write.latency_ns, 10);
    assert_eq!(report.read.latency_ns, 20);
    assert_eq!(report.read_head(), [0xEE; 16]);
}

proptest! {
    #[test]
    fn round_trip_holds_at_every_line(line in 0u64..64) {
        let space = small_space();
        let addr = line * space.line_size();
        let mut peer = SimulatedPeer::new(MemoryModel::new(space.size() as usize));

        let report = single_exchange(&mut peer, addr, space.line_size()).unwrap();

        prop_assert!(report.round_trip_matches());
        prop_assert_eq!(report.addr, addr);
        prop_assert_eq!(peer.model.addrs_of(OpType::Write), vec![addr]);
        prop_assert_eq!(peer.model.addrs_of(OpType::Read), vec![addr]);
    }
}
