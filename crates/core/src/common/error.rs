//! Error definitions.
//!
//! This module defines every failure class of the benchmark client. It provides:
//! 1. **Setup Errors:** Failures before any protocol exchange (resolve, connect).
//! 2. **Transport Errors:** Send/receive failures on an established session.
//! 3. **Codec and Config Errors:** Malformed records and invalid geometry or config files.
//! 4. **Client Errors:** Transport failures or non-zero peer status on checked operations.
//!
//! There is no retry policy: every error is terminal to the operation that produced it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::net::codec::OpType;

/// Failure to establish a session with the peer.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The peer address did not resolve to any socket address.
    #[error("could not resolve peer address {addr}: {source}")]
    Resolve {
        /// Human-readable peer address.
        addr: String,
        /// Resolver error, or `NotFound` if resolution returned no addresses.
        #[source]
        source: io::Error,
    },

    /// Every resolved address refused or failed the connection.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Human-readable peer address.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
}

/// Failure while moving one record across an established session.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Writing a request failed (closed, reset or short write).
    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    /// Reading a response failed for a reason other than end of stream.
    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    /// The peer closed the stream before a full response arrived.
    #[error("peer closed the connection after {received} of {expected} response bytes")]
    Closed {
        /// Bytes of the partial response received before end of stream.
        received: usize,
        /// Size of a complete response record.
        expected: usize,
    },
}

/// Malformed record on the wire.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The request op byte is neither READ nor WRITE.
    #[error("unknown op type {0}")]
    UnknownOp(u8),
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Address-space geometry or workload addresses violate a constraint.
    #[error("invalid geometry: {0}")]
    Geometry(String),

    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The config document is not valid JSON for [`BenchConfig`](crate::config::BenchConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a status-checked client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The session failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The peer answered with a non-zero status.
    #[error("{op} at {addr:#x} failed with status {status}")]
    Status {
        /// Operation that failed.
        op: OpType,
        /// Address of the failed operation.
        addr: u64,
        /// Status code returned by the peer.
        status: u8,
    },

    /// A WRITE payload is larger than one line.
    #[error("payload of {len} bytes exceeds the {max}-byte line")]
    PayloadTooLarge {
        /// Requested payload length.
        len: usize,
        /// Maximum payload length.
        max: usize,
    },
}

/// Top-level error for a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Session establishment failed.
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// The session failed outside a loop that tolerates it.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A checked operation failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The trace file could not be opened.
    #[error("failed to open trace {}: {source}", .path.display())]
    Trace {
        /// Path of the trace file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing the report to the output sink failed.
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}
