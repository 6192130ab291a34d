//! TFTP core protocol implementation
//!
//! This module contains the core components of the TFTP protocol:
//! - `packet`: Packet serialization and deserialization
//! - `factory`: Packet construction from datagrams and transfer parameters
//! - `block`: Block numbering and block-sized reads
//! - `socket`: Per-transfer UDP socket

pub mod block;
pub mod factory;
mod packet;
mod socket;

// Public core types
pub use block::{BLOCK_WRAP, BlockReader, next_block};
pub use packet::{
    BLOCK_SIZE, ErrorCode, MODE_OCTET, MalformedPacket, OPCODE_ACK, OPCODE_DATA, OPCODE_ERROR,
    OPCODE_RRQ, OPCODE_WRQ, Packet,
};
pub use socket::{Received, TransferSocket};
