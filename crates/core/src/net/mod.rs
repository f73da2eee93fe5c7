//! Wire protocol and transport.
//!
//! This module provides:
//! 1. **Codec:** Fixed-size request and response records with an explicit byte layout.
//! 2. **Transport:** The blocking one-record-at-a-time [`Transport`] trait and the
//!    stream-backed [`Session`] that implements it.

/// Request/response records and their byte layout.
pub mod codec;

/// Transport trait and stream session.
pub mod transport;

pub use codec::{Line, OpType, REQUEST_SIZE, RESPONSE_SIZE, Request, Response};
pub use transport::{Session, Transport};
