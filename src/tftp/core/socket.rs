use std::io::{self, ErrorKind};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use super::factory;
use super::packet::{MalformedPacket, Packet};

/// Receive buffer size; larger datagrams are truncated and fail to decode.
const RECV_BUFFER_LEN: usize = 1024;

/// Outcome of a single receive on a [`TransferSocket`]
#[derive(Debug)]
pub enum Received {
    Packet(Packet, SocketAddr),
    Malformed(MalformedPacket, SocketAddr),
    TimedOut,
}

/// UDP socket owned by one transfer
///
/// The socket is never connected: the server answers from a fresh port
/// (its transfer ID), so replies are accepted from any source and the caller
/// decides where the next packet goes.
pub struct TransferSocket {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl TransferSocket {
    /// Bind an ephemeral local port in the address family of `server`
    pub fn bind_for(server: SocketAddr, timeout: Duration) -> io::Result<Self> {
        let local = match server.ip() {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(local)?;
        socket.set_read_timeout(Some(timeout))?;
        socket.set_write_timeout(Some(timeout))?;

        Ok(Self {
            socket,
            buf: vec![0u8; RECV_BUFFER_LEN],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn send_to(&self, packet: &Packet, addr: SocketAddr) -> io::Result<()> {
        self.socket.send_to(&packet.serialize(), addr)?;
        Ok(())
    }

    /// Wait up to the configured timeout for one datagram
    pub fn recv(&mut self) -> io::Result<Received> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((amt, from)) => Ok(match factory::from_datagram(&self.buf[..amt]) {
                Ok(packet) => Received::Packet(packet, from),
                Err(err) => Received::Malformed(err, from),
            }),
            // Unix reports an expired read timeout as WouldBlock, Windows as TimedOut
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Ok(Received::TimedOut)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_datagrams_and_timeouts() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server_addr = server.local_addr().unwrap();
        let timeout = Duration::from_millis(50);
        let mut socket = TransferSocket::bind_for(server_addr, timeout).unwrap();
        let client_port = socket.local_addr().unwrap().port();
        let client_addr: SocketAddr = ([127, 0, 0, 1], client_port).into();

        let ack = Packet::Ack(3).serialize();
        server.send_to(&ack, client_addr).unwrap();
        match socket.recv().unwrap() {
            Received::Packet(Packet::Ack(3), from) => assert_eq!(from, server_addr),
            other => panic!("unexpected {other:?}"),
        }

        server.send_to(&[0, 42], client_addr).unwrap();
        match socket.recv().unwrap() {
            Received::Malformed(err, _) => assert_eq!(err, MalformedPacket::UnknownOpcode(42)),
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(socket.recv().unwrap(), Received::TimedOut));
    }
}
