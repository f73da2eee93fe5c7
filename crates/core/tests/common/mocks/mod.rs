//! Mock implementations of the memory server and its transport.

/// Loopback TCP memory server.
pub mod loopback;
/// `mockall` transport.
pub mod transport;
