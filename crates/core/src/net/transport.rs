//! Blocking transport for one record at a time.
//!
//! This module provides:
//! 1. **Transport:** The seam every workload driver talks to; one request out, one
//!    response in, strictly alternating.
//! 2. **Session:** A [`Transport`] over any connected, ordered, reliable byte stream
//!    (TCP in production, loopback or in-memory streams in tests).
//!
//! Both operations block the calling thread with no timeout. A peer that never answers
//! stalls the caller until the process is terminated.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use super::codec::{RESPONSE_SIZE, Request, Response};
use crate::common::error::{SetupError, TransportError};

/// One-record-at-a-time request/response channel to the memory server.
///
/// Callers must receive exactly one response for every request sent before sending the
/// next one; the protocol has no request identifiers to match out-of-order replies.
pub trait Transport {
    /// Sends one encoded request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] if the full record could not be written.
    fn send_request(&mut self, request: &Request) -> Result<(), TransportError>;

    /// Blocks until one complete response has been received.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] on end of stream before a full record, or
    /// [`TransportError::Receive`] on any other stream error.
    fn receive_response(&mut self) -> Result<Response, TransportError>;

    /// Sends `request` and waits for its response.
    ///
    /// # Errors
    ///
    /// Propagates the first error of either half of the exchange.
    fn exchange(&mut self, request: &Request) -> Result<Response, TransportError> {
        self.send_request(request)?;
        self.receive_response()
    }
}

/// Transport session over a connected byte stream.
///
/// The stream is owned by the session and released exactly once when the session is
/// dropped, whichever path the caller exits through.
#[derive(Debug)]
pub struct Session<S> {
    stream: S,
    exchanges: u64,
}

impl Session<TcpStream> {
    /// Connects to the memory server.
    ///
    /// # Arguments
    ///
    /// * `host` - Host name or IP address of the peer.
    /// * `port` - TCP port of the peer.
    /// * `nodelay` - Disable Nagle's algorithm on the socket.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Resolve`] if the address does not resolve, or
    /// [`SetupError::Connect`] with the last socket error if no address accepts.
    pub fn connect(host: &str, port: u16, nodelay: bool) -> Result<Self, SetupError> {
        let peer = format!("{host}:{port}");
        let addrs: Vec<_> = (host, port)
            .to_socket_addrs()
            .map_err(|source| SetupError::Resolve {
                addr: peer.clone(),
                source,
            })?
            .collect();

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    stream
                        .set_nodelay(nodelay)
                        .map_err(|source| SetupError::Connect {
                            addr: peer.clone(),
                            source,
                        })?;
                    info!(%addr, nodelay, "connected to memory server");
                    return Ok(Self::new(stream));
                }
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(source) => Err(SetupError::Connect { addr: peer, source }),
            None => Err(SetupError::Resolve {
                addr: peer,
                source: io::Error::new(ErrorKind::NotFound, "no socket addresses resolved"),
            }),
        }
    }
}

impl<S: Read + Write> Session<S> {
    /// Wraps an already connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            exchanges: 0,
        }
    }

    /// Returns the number of complete responses received so far.
    pub fn exchanges(&self) -> u64 {
        self.exchanges
    }

    /// Returns a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Consumes the session and returns the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Reads until `buf` is full; short reads keep accumulating.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(TransportError::Closed {
                        received: filled,
                        expected: buf.len(),
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(TransportError::Receive(e)),
            }
        }
        Ok(())
    }
}

impl<S: Read + Write> Transport for Session<S> {
    fn send_request(&mut self, request: &Request) -> Result<(), TransportError> {
        let buf = request.encode();
        self.stream
            .write_all(&buf)
            .and_then(|()| self.stream.flush())
            .map_err(TransportError::Send)
    }

    fn receive_response(&mut self) -> Result<Response, TransportError> {
        let mut buf = [0u8; RESPONSE_SIZE];
        self.read_full(&mut buf)?;
        self.exchanges += 1;
        Ok(Response::decode(&buf))
    }
}

/// Returns `true` if `err` means the peer went away rather than misbehaved.
pub fn is_disconnect(err: &TransportError) -> bool {
    match err {
        TransportError::Closed { .. } => true,
        TransportError::Send(e) | TransportError::Receive(e) => matches!(
            e.kind(),
            ErrorKind::BrokenPipe
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::UnexpectedEof
        ),
    }
}
