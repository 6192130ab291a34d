//! Simulated TFTP server for loopback tests
//!
//! The server listens on a request port and answers from a second socket,
//! the way real servers hand each transfer its own port.

#![allow(dead_code)]

use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tftpc::tftp::client::{ClientConfig, Logger, SessionContext};
use tftpc::tftp::core::Packet;

/// Client receive timeout used by every test
pub const CLIENT_TIMEOUT: Duration = Duration::from_millis(200);

/// How long the server waits before deciding the client went quiet
pub const QUIET: Duration = Duration::from_millis(600);

pub struct FakeServer {
    listen: UdpSocket,
    transfer: UdpSocket,
}

impl FakeServer {
    /// Next datagram on the request port
    pub fn recv_request(&self) -> Option<(Packet, SocketAddr)> {
        recv_on(&self.listen)
    }

    /// Next datagram on the transfer port
    pub fn recv(&self) -> Option<(Packet, SocketAddr)> {
        recv_on(&self.transfer)
    }

    /// Send from the transfer port
    pub fn send(&self, packet: &Packet, to: SocketAddr) {
        self.transfer.send_to(&packet.serialize(), to).unwrap();
    }

    pub fn send_raw(&self, bytes: &[u8], to: SocketAddr) {
        self.transfer.send_to(bytes, to).unwrap();
    }

    /// Everything the client sends to the transfer port until it goes quiet
    pub fn drain(&self) -> Vec<Packet> {
        std::iter::from_fn(|| self.recv())
            .map(|(packet, _)| packet)
            .collect()
    }

    /// Count requests until the client goes quiet
    pub fn count_requests(&self) -> usize {
        std::iter::from_fn(|| self.recv_request()).count()
    }
}

fn recv_on(socket: &UdpSocket) -> Option<(Packet, SocketAddr)> {
    let mut buf = [0u8; 1024];
    match socket.recv_from(&mut buf) {
        Ok((amt, from)) => Some((Packet::deserialize(&buf[..amt]).unwrap(), from)),
        Err(_) => None,
    }
}

/// Run `script` as the server on its own thread; returns the request address
pub fn spawn_server<T, F>(script: F) -> (SocketAddr, JoinHandle<T>)
where
    T: Send + 'static,
    F: FnOnce(FakeServer) -> T + Send + 'static,
{
    let listen = UdpSocket::bind("127.0.0.1:0").unwrap();
    let transfer = UdpSocket::bind("127.0.0.1:0").unwrap();
    listen.set_read_timeout(Some(QUIET)).unwrap();
    transfer.set_read_timeout(Some(QUIET)).unwrap();
    let addr = listen.local_addr().unwrap();

    let handle = thread::spawn(move || script(FakeServer { listen, transfer }));
    (addr, handle)
}

pub fn test_config() -> ClientConfig {
    ClientConfig::default()
        .with_timeout(CLIENT_TIMEOUT)
        .with_retries(4)
}

/// Log lines captured from a session or client
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<String>>>);

impl Captured {
    pub fn logger(&self) -> Logger {
        let lines = self.0.clone();
        Logger::new(move |line: &str| {
            lines.lock().unwrap().push(line.to_string());
        })
    }

    pub fn push(&self, line: &str) {
        self.0.lock().unwrap().push(line.to_string());
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

pub fn context() -> (SessionContext, Captured) {
    let _ = env_logger::builder().is_test(true).try_init();
    let captured = Captured::default();
    let ctx = SessionContext::new(test_config(), captured.logger());
    (ctx, captured)
}

pub fn data(block_num: u16, data: &[u8]) -> Packet {
    Packet::Data {
        block_num,
        data: data.to_vec(),
    }
}

/// Deterministic file contents
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
