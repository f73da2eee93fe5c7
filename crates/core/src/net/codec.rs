//! Request and response records.
//!
//! The memory server exchanges C structures in their natural layout on a 64-bit
//! little-endian host. Instead of relying on Rust's struct layout, every field is encoded
//! at an explicit offset and the alignment padding is written as zero:
//!
//! ```text
//! Request  (96 bytes): op_type@0 pad[7]@1 addr@8 size@16 timestamp@24 data[64]@32
//! Response (80 bytes): status@0  pad[7]@1 latency_ns@8 data[64]@16
//! ```
//!
//! The layout is not negotiated with the peer; a mismatch corrupts data silently.

use std::fmt;

use serde::Serialize;

use crate::common::constants::{LINE_BYTES, STATUS_OK};
use crate::common::error::CodecError;

/// One cache line of payload.
pub type Line = [u8; LINE_BYTES];

/// Encoded size of a [`Request`] in bytes.
pub const REQUEST_SIZE: usize = 96;

/// Encoded size of a [`Response`] in bytes.
pub const RESPONSE_SIZE: usize = 80;

mod offsets {
    pub const REQ_OP: usize = 0;
    pub const REQ_ADDR: usize = 8;
    pub const REQ_SIZE: usize = 16;
    pub const REQ_TIMESTAMP: usize = 24;
    pub const REQ_DATA: usize = 32;

    pub const RESP_STATUS: usize = 0;
    pub const RESP_LATENCY: usize = 8;
    pub const RESP_DATA: usize = 16;
}

/// Memory operation selected by a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum OpType {
    /// Load one line.
    Read = 0,
    /// Store one line.
    Write = 1,
}

impl TryFrom<u8> for OpType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Read),
            1 => Ok(Self::Write),
            other => Err(CodecError::UnknownOp(other)),
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "READ"),
            Self::Write => write!(f, "WRITE"),
        }
    }
}

/// Client-to-peer record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Operation to perform.
    pub op: OpType,
    /// Offset into the simulated region; the sender wraps it into range.
    pub addr: u64,
    /// Access size in bytes; reserved, always the line size in practice.
    pub size: u64,
    /// Reserved for the peer; always zero from this client.
    pub timestamp: u64,
    /// Bytes to store for WRITE; not interpreted for READ.
    pub data: Line,
}

impl Request {
    /// Creates a READ request with a zero payload.
    pub fn read(addr: u64, size: u64) -> Self {
        Self {
            op: OpType::Read,
            addr,
            size,
            timestamp: 0,
            data: [0; LINE_BYTES],
        }
    }

    /// Creates a WRITE request carrying `data`.
    pub fn write(addr: u64, size: u64, data: Line) -> Self {
        Self {
            op: OpType::Write,
            addr,
            size,
            timestamp: 0,
            data,
        }
    }

    /// Encodes the record into its fixed wire layout.
    pub fn encode(&self) -> [u8; REQUEST_SIZE] {
        let mut buf = [0u8; REQUEST_SIZE];
        buf[offsets::REQ_OP] = self.op as u8;
        put_u64(&mut buf, offsets::REQ_ADDR, self.addr);
        put_u64(&mut buf, offsets::REQ_SIZE, self.size);
        put_u64(&mut buf, offsets::REQ_TIMESTAMP, self.timestamp);
        buf[offsets::REQ_DATA..].copy_from_slice(&self.data);
        buf
    }

    /// Decodes a record from its fixed wire layout; padding bytes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownOp`] if the op byte is not a known [`OpType`].
    pub fn decode(buf: &[u8; REQUEST_SIZE]) -> Result<Self, CodecError> {
        let op = OpType::try_from(buf[offsets::REQ_OP])?;
        let mut data = [0u8; LINE_BYTES];
        data.copy_from_slice(&buf[offsets::REQ_DATA..]);
        Ok(Self {
            op,
            addr: get_u64(buf, offsets::REQ_ADDR),
            size: get_u64(buf, offsets::REQ_SIZE),
            timestamp: get_u64(buf, offsets::REQ_TIMESTAMP),
            data,
        })
    }
}

/// Peer-to-client record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// Result code; zero is success.
    pub status: u8,
    /// Server-measured service time in nanoseconds.
    pub latency_ns: u64,
    /// Line contents for READ; peer-defined for WRITE.
    pub data: Line,
}

impl Response {
    /// Returns `true` if the peer reported success.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Encodes the record into its fixed wire layout.
    pub fn encode(&self) -> [u8; RESPONSE_SIZE] {
        let mut buf = [0u8; RESPONSE_SIZE];
        buf[offsets::RESP_STATUS] = self.status;
        put_u64(&mut buf, offsets::RESP_LATENCY, self.latency_ns);
        buf[offsets::RESP_DATA..].copy_from_slice(&self.data);
        buf
    }

    /// Decodes a record from its fixed wire layout; padding bytes are ignored.
    pub fn decode(buf: &[u8; RESPONSE_SIZE]) -> Self {
        let mut data = [0u8; LINE_BYTES];
        data.copy_from_slice(&buf[offsets::RESP_DATA..]);
        Self {
            status: buf[offsets::RESP_STATUS],
            latency_ns: get_u64(buf, offsets::RESP_LATENCY),
            data,
        }
    }
}

#[inline]
fn put_u64(buf: &mut [u8], at: usize, val: u64) {
    buf[at..at + 8].copy_from_slice(&val.to_le_bytes());
}

#[inline]
fn get_u64(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}
