use cxlbench_core::common::TransportError;
use cxlbench_core::net::{Request, Response, Transport};
use mockall::mock;

mock! {
    pub Transport {}

    impl Transport for Transport {
        fn send_request(&mut self, request: &Request) -> Result<(), TransportError>;
        fn receive_response(&mut self) -> Result<Response, TransportError>;
    }
}

/// A broken-pipe send error.
pub fn broken_pipe() -> TransportError {
    TransportError::Send(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
}

/// A connection-reset receive error.
pub fn connection_reset() -> TransportError {
    TransportError::Receive(std::io::Error::from(std::io::ErrorKind::ConnectionReset))
}
