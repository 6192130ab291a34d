//! Block number bookkeeping and block-sized reads

use std::io::{self, Read};

use super::packet::BLOCK_SIZE;

/// Block numbers never reach this value; the sequence restarts at 1 instead.
pub const BLOCK_WRAP: u16 = 32768;

/// Block number that follows `block_num`, wrapping to 1 at [`BLOCK_WRAP`]
pub fn next_block(block_num: u16) -> u16 {
    let next = block_num.wrapping_add(1);
    if next >= BLOCK_WRAP || next == 0 {
        1
    } else {
        next
    }
}

/// Cuts a byte stream into numbered DATA payloads
///
/// Every block but the last carries exactly [`BLOCK_SIZE`] bytes. When the
/// stream length is a multiple of the block size, a trailing empty block is
/// produced so the receiver can tell the transfer has ended.
pub struct BlockReader<R> {
    reader: R,
    block_num: u16,
    finished: bool,
}

impl<R: Read> BlockReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            block_num: 0,
            finished: false,
        }
    }

    /// Next `(block_num, payload)` pair, or `None` once the short block was produced
    pub fn next_block(&mut self) -> io::Result<Option<(u16, Vec<u8>)>> {
        if self.finished {
            return Ok(None);
        }

        let mut data = Vec::with_capacity(BLOCK_SIZE);
        self.reader
            .by_ref()
            .take(BLOCK_SIZE as u64)
            .read_to_end(&mut data)?;

        if data.len() < BLOCK_SIZE {
            self.finished = true;
        }
        self.block_num = next_block(self.block_num);
        Ok(Some((self.block_num, data)))
    }
}
