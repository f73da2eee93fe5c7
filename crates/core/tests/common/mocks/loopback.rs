use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use cxlbench_core::net::{REQUEST_SIZE, Request};

use super::peer::MemoryModel;

/// How the loopback server ends or delivers its responses.
#[derive(Debug, Clone, Copy, Default)]
pub enum Behavior {
    /// Answer every request in one write until the client disconnects.
    #[default]
    Cooperative,
    /// Answer every request one byte at a time.
    Trickle,
    /// Close the connection after answering this many requests.
    CloseAfter(usize),
    /// Send only this many bytes of the first response, then close.
    TruncateFirst(usize),
}

/// A memory server on `127.0.0.1` serving one connection from a [`MemoryModel`].
#[derive(Debug)]
pub struct LoopbackPeer {
    pub addr: SocketAddr,
    handle: JoinHandle<MemoryModel>,
}

impl LoopbackPeer {
    pub fn spawn(model: MemoryModel, behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            serve(stream, model, behavior)
        });
        Self { addr, handle }
    }

    /// Waits for the server to finish and returns its final memory state.
    pub fn join(self) -> MemoryModel {
        self.handle.join().unwrap()
    }
}

fn serve(mut stream: TcpStream, mut model: MemoryModel, behavior: Behavior) -> MemoryModel {
    let mut served = 0usize;
    loop {
        if let Behavior::CloseAfter(n) = behavior {
            if served == n {
                return model;
            }
        }

        let mut buf = [0u8; REQUEST_SIZE];
        match stream.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return model,
            Err(e) => panic!("loopback read failed: {e}"),
        }
        let request = Request::decode(&buf).unwrap();
        let bytes = model.serve(&request).encode();

        let written = match behavior {
            Behavior::Trickle => bytes
                .iter()
                .try_for_each(|b| stream.write_all(std::slice::from_ref(b)).and_then(|()| stream.flush())),
            Behavior::TruncateFirst(n) => {
                let _ = stream.write_all(&bytes[..n]);
                return model;
            }
            Behavior::Cooperative | Behavior::CloseAfter(_) => stream.write_all(&bytes),
        };
        if written.is_err() {
            return model;
        }
        served += 1;
    }
}

/// Returns a loopback address nothing is listening on.
pub fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
