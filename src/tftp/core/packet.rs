use std::fmt;

use thiserror::Error;

/// Largest DATA payload; a shorter payload ends the transfer.
pub const BLOCK_SIZE: usize = 512;

/// The only transfer mode this client speaks.
pub const MODE_OCTET: &str = "octet";

pub const OPCODE_RRQ: u16 = 1;
pub const OPCODE_WRQ: u16 = 2;
pub const OPCODE_DATA: u16 = 3;
pub const OPCODE_ACK: u16 = 4;
pub const OPCODE_ERROR: u16 = 5;

/// Datagram that could not be decoded into a [`Packet`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPacket {
    #[error("datagram too short to carry an opcode ({0} bytes)")]
    Empty(usize),
    #[error("unknown opcode {0}")]
    UnknownOpcode(u16),
    #[error("{0} packet truncated")]
    Truncated(&'static str),
    #[error("{0} packet is missing a NUL terminator")]
    Unterminated(&'static str),
    #[error("DATA payload of {0} bytes exceeds the block size")]
    Oversized(usize),
}

/// Error codes defined by RFC 1350
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotDefined = 0,
    FileNotFound = 1,
    AccessViolation = 2,
    DiskFull = 3,
    IllegalOperation = 4,
    UnknownTransferId = 5,
    FileExists = 6,
    NoSuchUser = 7,
}

impl ErrorCode {
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::NotDefined),
            1 => Some(Self::FileNotFound),
            2 => Some(Self::AccessViolation),
            3 => Some(Self::DiskFull),
            4 => Some(Self::IllegalOperation),
            5 => Some(Self::UnknownTransferId),
            6 => Some(Self::FileExists),
            7 => Some(Self::NoSuchUser),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::NotDefined => "Not defined",
            Self::FileNotFound => "File not found",
            Self::AccessViolation => "Access violation",
            Self::DiskFull => "Disk full or allocation exceeded",
            Self::IllegalOperation => "Illegal TFTP operation",
            Self::UnknownTransferId => "Unknown transfer ID",
            Self::FileExists => "File already exists",
            Self::NoSuchUser => "No such user",
        }
    }
}

/// A TFTP packet as it travels on the wire
///
/// ```text
/// RRQ/WRQ  | 01/02 | filename | 0 | mode | 0 |
/// DATA     | 03    | block    | data (0..=512) |
/// ACK      | 04    | block    |
/// ERROR    | 05    | code     | message | 0 |
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Rrq { filename: String, mode: String },
    Wrq { filename: String, mode: String },
    Data { block_num: u16, data: Vec<u8> },
    Ack(u16),
    Error { code: u16, msg: String },
}

impl Packet {
    pub fn opcode(&self) -> u16 {
        match self {
            Packet::Rrq { .. } => OPCODE_RRQ,
            Packet::Wrq { .. } => OPCODE_WRQ,
            Packet::Data { .. } => OPCODE_DATA,
            Packet::Ack(_) => OPCODE_ACK,
            Packet::Error { .. } => OPCODE_ERROR,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Packet::Rrq { .. } => "RRQ",
            Packet::Wrq { .. } => "WRQ",
            Packet::Data { .. } => "DATA",
            Packet::Ack(_) => "ACK",
            Packet::Error { .. } => "ERROR",
        }
    }

    /// Encode the packet into its wire representation
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + BLOCK_SIZE);
        buf.extend_from_slice(&self.opcode().to_be_bytes());

        match self {
            Packet::Rrq { filename, mode } | Packet::Wrq { filename, mode } => {
                buf.extend_from_slice(filename.as_bytes());
                buf.push(0);
                buf.extend_from_slice(mode.as_bytes());
                buf.push(0);
            }
            Packet::Data { block_num, data } => {
                buf.extend_from_slice(&block_num.to_be_bytes());
                buf.extend_from_slice(data);
            }
            Packet::Ack(block_num) => {
                buf.extend_from_slice(&block_num.to_be_bytes());
            }
            Packet::Error { code, msg } => {
                buf.extend_from_slice(&code.to_be_bytes());
                buf.extend_from_slice(msg.as_bytes());
                buf.push(0);
            }
        }

        buf
    }

    /// Decode a received datagram, dispatching on its opcode
    pub fn deserialize(buf: &[u8]) -> Result<Packet, MalformedPacket> {
        let (opcode, body) = match buf {
            [hi, lo, body @ ..] => (u16::from_be_bytes([*hi, *lo]), body),
            _ => return Err(MalformedPacket::Empty(buf.len())),
        };

        match opcode {
            OPCODE_RRQ | OPCODE_WRQ => {
                let kind = if opcode == OPCODE_RRQ { "RRQ" } else { "WRQ" };
                let (filename, rest) = take_cstr(body, kind)?;
                let (mode, _) = take_cstr(rest, kind)?;
                if opcode == OPCODE_RRQ {
                    Ok(Packet::Rrq { filename, mode })
                } else {
                    Ok(Packet::Wrq { filename, mode })
                }
            }
            OPCODE_DATA => {
                let (block_num, data) = take_u16(body, "DATA")?;
                if data.len() > BLOCK_SIZE {
                    return Err(MalformedPacket::Oversized(data.len()));
                }
                Ok(Packet::Data {
                    block_num,
                    data: data.to_vec(),
                })
            }
            OPCODE_ACK => {
                let (block_num, _) = take_u16(body, "ACK")?;
                Ok(Packet::Ack(block_num))
            }
            OPCODE_ERROR => {
                let (code, rest) = take_u16(body, "ERROR")?;
                let (msg, _) = take_cstr(rest, "ERROR")?;
                Ok(Packet::Error { code, msg })
            }
            other => Err(MalformedPacket::UnknownOpcode(other)),
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Rrq { filename, mode } | Packet::Wrq { filename, mode } => {
                let (name, opcode) = (self.name(), self.opcode());
                write!(f, "{name}<{opcode}> file<{filename}> mode<{mode}>")
            }
            Packet::Data { block_num, data } => {
                write!(f, "DATA block {} ({} bytes)", block_num, data.len())
            }
            Packet::Ack(block_num) => write!(f, "ACK block {}", block_num),
            Packet::Error { code, msg } => match ErrorCode::from_u16(*code) {
                Some(known) => write!(f, "ERROR {} ({}): {}", code, known.description(), msg),
                None => write!(f, "ERROR {}: {}", code, msg),
            },
        }
    }
}

fn take_u16<'a>(buf: &'a [u8], kind: &'static str) -> Result<(u16, &'a [u8]), MalformedPacket> {
    match buf {
        [hi, lo, rest @ ..] => Ok((u16::from_be_bytes([*hi, *lo]), rest)),
        _ => Err(MalformedPacket::Truncated(kind)),
    }
}

fn take_cstr<'a>(buf: &'a [u8], kind: &'static str) -> Result<(String, &'a [u8]), MalformedPacket> {
    let end = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(MalformedPacket::Unterminated(kind))?;
    let text = String::from_utf8_lossy(&buf[..end]).into_owned();
    Ok((text, &buf[end + 1..]))
}
