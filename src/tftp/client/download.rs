use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::net::SocketAddr;
use std::path::Path;

use super::error::TransferError;
use super::session::{Direction, Session, SessionContext, TransferStats};
use crate::tftp::core::{BLOCK_SIZE, Packet, factory, next_block};

/// Download `remote` from the server into `local` (RRQ)
///
/// Once `local` has been created, a failed download never leaves it behind.
pub fn download(
    ctx: &SessionContext,
    server: SocketAddr,
    local: &Path,
    remote: &str,
) -> Result<TransferStats, TransferError> {
    let mut session = Session::open(ctx, Direction::Download, server)?;

    let request = factory::read_request(remote);
    session.send(&request)?;

    let file = File::create(local)?;
    let result = receive(ctx, &mut session, request, file);

    match &result {
        Ok(stats) => session.log(format!(
            "Finished server file {} -> {} ({} bytes, {} blocks)",
            remote,
            local.display(),
            stats.bytes,
            stats.blocks
        )),
        Err(_) => match fs::remove_file(local) {
            Ok(()) => session.log(format!("Removed partial file {}", local.display())),
            Err(e) => session.log(format!(
                "Failed to remove partial file {}: {}",
                local.display(),
                e
            )),
        },
    }

    result
}

fn receive(
    ctx: &SessionContext,
    session: &mut Session<'_>,
    request: Packet,
    file: File,
) -> Result<TransferStats, TransferError> {
    let mut out = BufWriter::new(file);
    let mut expected: u16 = 1;
    let mut stats = TransferStats::default();
    // The request until the first block arrives, then the ACK, reused for every block
    let mut last_sent = request;

    loop {
        if !ctx.is_running() {
            return Err(TransferError::Cancelled);
        }

        let data = session.await_reply(&last_sent, |packet| match packet {
            Packet::Data { block_num, data } if block_num == expected => Ok(data),
            Packet::Data { block_num, .. } => Err(TransferError::ProtocolViolation(format!(
                "DATA block {}, expected {}",
                block_num, expected
            ))),
            other => Err(TransferError::ProtocolViolation(format!(
                "unexpected {} (opcode {}) while waiting for DATA",
                other.name(),
                other.opcode()
            ))),
        })?;

        out.write_all(&data)?;
        stats.blocks += 1;
        stats.bytes += data.len() as u64;

        // The final ACK tells the server the file is complete
        let finished = data.len() < BLOCK_SIZE;
        if finished {
            out.flush()?;
        }

        match &mut last_sent {
            Packet::Ack(block_num) => *block_num = expected,
            _ => last_sent = factory::ack(expected),
        }
        session.send(&last_sent)?;

        if finished {
            return Ok(stats);
        }
        expected = next_block(expected);
    }
}
