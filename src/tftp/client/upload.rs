use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;

use super::error::TransferError;
use super::session::{Direction, Session, SessionContext, TransferStats};
use crate::tftp::core::{BlockReader, Packet, factory};

/// Upload `local` to the server as `remote` (WRQ)
///
/// Blocks the calling thread until the last DATA block is acknowledged or
/// the session aborts.
pub fn upload(
    ctx: &SessionContext,
    server: SocketAddr,
    local: &Path,
    remote: &str,
) -> Result<TransferStats, TransferError> {
    let file = File::open(local)?;
    let mut session = Session::open(ctx, Direction::Upload, server)?;

    let request = factory::write_request(remote);
    session.send(&request)?;

    // Any ACK opens the transfer; its block number is not checked
    let initial = session.await_reply(&request, |packet| match packet {
        Packet::Ack(block_num) => Ok(block_num),
        other => Err(unexpected(&other)),
    })?;
    session.log(format!("Write request accepted (ACK {})", initial));
    session.log(format!("Open file {}", local.display()));

    let mut blocks = BlockReader::new(BufReader::new(file));
    let mut stats = TransferStats::default();

    while let Some((block_num, data)) = blocks.next_block()? {
        if !ctx.is_running() {
            return Err(TransferError::Cancelled);
        }

        let len = data.len() as u64;
        let packet = factory::data(block_num, data);
        session.send(&packet)?;
        session.await_reply(&packet, |reply| match reply {
            Packet::Ack(acked) if acked == block_num => Ok(()),
            Packet::Ack(acked) => Err(TransferError::ProtocolViolation(format!(
                "ACK for block {}, expected {}",
                acked, block_num
            ))),
            other => Err(unexpected(&other)),
        })?;

        stats.blocks += 1;
        stats.bytes += len;
    }

    session.log(format!(
        "Finished {} -> server file {} ({} bytes, {} blocks)",
        local.display(),
        remote,
        stats.bytes,
        stats.blocks
    ));
    Ok(stats)
}

fn unexpected(packet: &Packet) -> TransferError {
    TransferError::ProtocolViolation(format!(
        "unexpected {} (opcode {}) while waiting for ACK",
        packet.name(),
        packet.opcode()
    ))
}
