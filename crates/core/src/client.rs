//! Status-checked memory client.
//!
//! [`MemClient`] turns raw exchanges into plain `read`/`write` calls and treats a non-zero
//! response status as an error. The measurement drivers in [`workload`](crate::workload)
//! that must not branch on status talk to the [`Transport`] directly instead.

use crate::common::constants::LINE_BYTES;
use crate::common::error::ClientError;
use crate::net::codec::{Line, OpType, Request, Response};
use crate::net::transport::Transport;

/// Read/write access to the peer's memory with status checking.
#[derive(Debug)]
pub struct MemClient<T> {
    transport: T,
    line_size: u64,
}

impl<T: Transport> MemClient<T> {
    /// Wraps a transport; READs request `line_size` bytes.
    pub fn new(transport: T, line_size: u64) -> Self {
        Self {
            transport,
            line_size,
        }
    }

    /// Returns the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the client and returns the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Reads one line.
    ///
    /// # Returns
    ///
    /// The line contents and the server-reported latency in nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the session fails or
    /// [`ClientError::Status`] if the peer reports failure.
    pub fn read(&mut self, addr: u64) -> Result<(Line, u64), ClientError> {
        self.read_sized(addr, self.line_size)
    }

    /// Reads one line with an explicit `size` field.
    ///
    /// # Errors
    ///
    /// See [`MemClient::read`].
    pub fn read_sized(&mut self, addr: u64, size: u64) -> Result<(Line, u64), ClientError> {
        let response = self.transport.exchange(&Request::read(addr, size))?;
        let response = check(OpType::Read, addr, response)?;
        Ok((response.data, response.latency_ns))
    }

    /// Writes up to one line of data; shorter payloads are zero padded.
    ///
    /// The request `size` field is the payload length.
    ///
    /// # Returns
    ///
    /// The server-reported latency in nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::PayloadTooLarge`] for payloads longer than a line,
    /// [`ClientError::Transport`] if the session fails or [`ClientError::Status`] if the
    /// peer reports failure.
    pub fn write(&mut self, addr: u64, data: &[u8]) -> Result<u64, ClientError> {
        if data.len() > LINE_BYTES {
            return Err(ClientError::PayloadTooLarge {
                len: data.len(),
                max: LINE_BYTES,
            });
        }
        let mut line = [0u8; LINE_BYTES];
        line[..data.len()].copy_from_slice(data);
        let request = Request::write(addr, data.len() as u64, line);
        let response = self.transport.exchange(&request)?;
        Ok(check(OpType::Write, addr, response)?.latency_ns)
    }
}

fn check(op: OpType, addr: u64, response: Response) -> Result<Response, ClientError> {
    if response.is_ok() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            op,
            addr,
            status: response.status,
        })
    }
}
