use std::fmt;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::config::ClientConfig;
use super::error::TransferError;
use super::retry::Retry;
use super::sink::Logger;
use crate::tftp::core::{Packet, Received, TransferSocket};

/// Transfer direction, used as the prefix of every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upload => write!(f, "Upload"),
            Direction::Download => write!(f, "Download"),
        }
    }
}

/// What a transfer needs from its owner
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub config: ClientConfig,
    pub logger: Logger,
    running: Arc<AtomicBool>,
}

impl SessionContext {
    pub fn new(config: ClientConfig, logger: Logger) -> Self {
        Self::with_flag(config, logger, Arc::new(AtomicBool::new(true)))
    }

    pub(crate) fn with_flag(
        config: ClientConfig,
        logger: Logger,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            logger,
            running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask sessions using this context to stop at their next block
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Result of a completed transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub blocks: u64,
    pub bytes: u64,
}

/// Resolve `host`, `ip`, `ip:port` or `host:port`, falling back to `default_port`
pub fn resolve_server(server: &str, default_port: u16) -> Result<SocketAddr, TransferError> {
    let server = server.trim();
    if server.is_empty() {
        return Err(TransferError::InvalidAddress(server.to_string()));
    }
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = server.trim_matches(['[', ']']).parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, default_port));
    }

    let resolved = if server.contains(':') {
        server.to_socket_addrs()
    } else {
        (server, default_port).to_socket_addrs()
    };
    resolved
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| TransferError::InvalidAddress(server.to_string()))
}

/// One side of a stop-and-wait exchange
///
/// Owns the socket, the retry counter and the current peer. The peer starts
/// as the server's request port and follows the source of every accepted
/// reply.
pub(crate) struct Session<'a> {
    ctx: &'a SessionContext,
    direction: Direction,
    socket: TransferSocket,
    peer: SocketAddr,
    retry: Retry,
}

impl<'a> Session<'a> {
    pub fn open(
        ctx: &'a SessionContext,
        direction: Direction,
        server: SocketAddr,
    ) -> Result<Self, TransferError> {
        let socket = TransferSocket::bind_for(server, ctx.config.timeout)?;
        Ok(Self {
            ctx,
            direction,
            socket,
            peer: server,
            retry: Retry::new(ctx.config.max_retries),
        })
    }

    pub fn log(&self, line: impl AsRef<str>) {
        let line = format!("{}: {}", self.direction, line.as_ref());
        self.ctx.logger.line(line);
    }

    pub fn send(&self, packet: &Packet) -> Result<(), TransferError> {
        self.log(format!("Send {}", packet));
        self.socket.send_to(packet, self.peer)?;
        Ok(())
    }

    /// Wait for the reply to `last_sent`
    ///
    /// `accept` turns a received packet into the caller's value; returning a
    /// recoverable error discards the packet and keeps waiting without
    /// touching the retry budget. ERROR packets end the session. Timeouts
    /// consume the budget and retransmit `last_sent`, unless the context has
    /// been stopped in the meantime.
    pub fn await_reply<T>(
        &mut self,
        last_sent: &Packet,
        mut accept: impl FnMut(Packet) -> Result<T, TransferError>,
    ) -> Result<T, TransferError> {
        self.retry.reset();

        loop {
            match self.socket.recv()? {
                Received::TimedOut => {
                    if !self.ctx.is_running() {
                        self.log("Receive timed out, transfer stopped");
                        return Err(TransferError::Cancelled);
                    }
                    let attempt = match self.retry.on_timeout() {
                        Ok(attempt) => attempt,
                        Err(e) => {
                            self.log("Receive timed out, giving up");
                            return Err(e);
                        }
                    };
                    self.log("Receive timed out");
                    self.log(format!(
                        "Retrying: retry count {} of {}",
                        attempt, self.ctx.config.max_retries
                    ));
                    self.send(last_sent)?;
                }
                Received::Malformed(err, from) => {
                    self.log(format!("Ignoring datagram from {}: {}", from, err));
                }
                Received::Packet(packet, from) => {
                    self.log(format!("Received {} from {}", packet, from));
                    if let Packet::Error { code, msg } = packet {
                        return Err(TransferError::ServerError { code, message: msg });
                    }
                    match accept(packet) {
                        Ok(value) => {
                            self.peer = from;
                            return Ok(value);
                        }
                        Err(e) if e.is_recoverable() => {
                            self.log(format!("Ignoring packet: {}", e));
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_address_forms() {
        assert_eq!(
            resolve_server("127.0.0.1", 69).unwrap(),
            "127.0.0.1:69".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_server("127.0.0.1:6969", 69).unwrap(),
            "127.0.0.1:6969".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_server("::1", 69).unwrap(),
            "[::1]:69".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_server("[::1]:70", 69).unwrap(),
            "[::1]:70".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(resolve_server(" localhost ", 69).unwrap().port(), 69);
        assert_eq!(resolve_server("localhost:1069", 69).unwrap().port(), 1069);
    }

    #[test]
    fn rejects_unresolvable_address() {
        assert!(matches!(
            resolve_server("", 69),
            Err(TransferError::InvalidAddress(_))
        ));
        assert!(matches!(
            resolve_server("localhost:tftp", 69),
            Err(TransferError::InvalidAddress(_))
        ));
    }

    #[test]
    fn stop_clears_running_flag() {
        let ctx = SessionContext::new(ClientConfig::default(), Logger::silent());
        let clone = ctx.clone();
        assert!(clone.is_running());
        ctx.stop();
        assert!(!clone.is_running());
    }
}
