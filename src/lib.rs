//! Stop-and-wait TFTP client
//!
//! See [`tftp`] for the protocol engine and [`tftp::client::Client`] for the
//! callback based facade used by front ends.

pub mod tftp;
