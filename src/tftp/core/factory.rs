//! Packet construction
//!
//! The engine never builds [`Packet`] values by hand: requests always carry
//! octet mode, and received datagrams are always decoded through
//! [`from_datagram`].

use super::packet::{MODE_OCTET, MalformedPacket, Packet};

/// Decode a received datagram by dispatching on its opcode
pub fn from_datagram(buf: &[u8]) -> Result<Packet, MalformedPacket> {
    Packet::deserialize(buf)
}

/// Read request (download) for `filename` in octet mode
pub fn read_request(filename: &str) -> Packet {
    Packet::Rrq {
        filename: filename.to_string(),
        mode: MODE_OCTET.to_string(),
    }
}

/// Write request (upload) for `filename` in octet mode
pub fn write_request(filename: &str) -> Packet {
    Packet::Wrq {
        filename: filename.to_string(),
        mode: MODE_OCTET.to_string(),
    }
}

pub fn data(block_num: u16, data: Vec<u8>) -> Packet {
    Packet::Data { block_num, data }
}

pub fn ack(block_num: u16) -> Packet {
    Packet::Ack(block_num)
}
