//! Single WRITE/READ round trip.
//!
//! Validates one exchange of each kind against the peer: a WRITE of the ascending byte
//! pattern `0, 1, .., 63` followed by a READ of the same line. Nothing is aggregated.

use std::io::{self, Write};

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::info;

use crate::common::constants::{EXCHANGE_HEAD_BYTES, LINE_BYTES};
use crate::common::error::TransportError;
use crate::net::codec::{Line, OpType, Request, Response};
use crate::net::transport::Transport;
use crate::stats::{self, Report};

/// Responses of the WRITE and the READ, reported verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeReport {
    /// Address written and read.
    pub addr: u64,
    /// Response to the WRITE.
    pub write: Response,
    /// Response to the READ.
    pub read: Response,
}

/// Returns the ascending pattern `[0, 1, .., 63]`.
pub fn ascending_pattern() -> Line {
    let mut line = [0u8; LINE_BYTES];
    for (i, byte) in line.iter_mut().enumerate() {
        *byte = i as u8;
    }
    line
}

/// Writes the ascending pattern to `addr`, then reads it back.
///
/// The READ reuses the WRITE request with only the op changed, so it carries the same
/// address, size and payload bytes.
///
/// # Errors
///
/// Any transport error aborts the exchange.
pub fn single_exchange<T: Transport + ?Sized>(
    transport: &mut T,
    addr: u64,
    line_size: u64,
) -> Result<ExchangeReport, TransportError> {
    info!("writing pattern to {addr:#x}");
    let mut request = Request::write(addr, line_size, ascending_pattern());
    let write = transport.exchange(&request)?;

    info!("reading back from {addr:#x}");
    request.op = OpType::Read;
    let read = transport.exchange(&request)?;

    Ok(ExchangeReport { addr, write, read })
}

impl ExchangeReport {
    /// Returns the first bytes of the READ payload.
    pub fn read_head(&self) -> [u8; EXCHANGE_HEAD_BYTES] {
        let mut head = [0u8; EXCHANGE_HEAD_BYTES];
        head.copy_from_slice(&self.read.data[..EXCHANGE_HEAD_BYTES]);
        head
    }

    /// Returns `true` if the READ returned exactly the pattern written.
    pub fn round_trip_matches(&self) -> bool {
        self.read.data == ascending_pattern()
    }
}

impl Report for ExchangeReport {
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
        stats::write_header(out, &format!("SINGLE EXCHANGE AT {:#x}", self.addr))?;
        writeln!(
            out,
            "Write completed with status {}, latency {} ns",
            self.write.status, self.write.latency_ns
        )?;
        writeln!(
            out,
            "Read completed with status {}, latency {} ns",
            self.read.status, self.read.latency_ns
        )?;
        write!(out, "Read data: ")?;
        for byte in self.read_head() {
            write!(out, "{byte:02x} ")?;
        }
        writeln!(out, "...")?;
        stats::write_footer(out)
    }
}

impl Serialize for ExchangeReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ExchangeReport", 7)?;
        s.serialize_field("addr", &self.addr)?;
        s.serialize_field("write_status", &self.write.status)?;
        s.serialize_field("write_latency_ns", &self.write.latency_ns)?;
        s.serialize_field("read_status", &self.read.status)?;
        s.serialize_field("read_latency_ns", &self.read.latency_ns)?;
        s.serialize_field("read_head", &self.read_head())?;
        s.serialize_field("round_trip_matches", &self.round_trip_matches())?;
        s.end()
    }
}
