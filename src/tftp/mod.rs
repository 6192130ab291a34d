//! TFTP (Trivial File Transfer Protocol) client
//!
//! Implements the client side of [RFC 1350](https://www.rfc-editor.org/rfc/rfc1350)
//! TFTP version 2: octet mode, 512 byte blocks, one DATA/ACK exchange in
//! flight, timeout based retransmission. Option negotiation (RFC 2347 and
//! later) is not supported.
//!
//! ## Module Structure
//!
//! ```text
//! tftp/
//! ├── core/           # Core protocol implementation
//! │   ├── packet      # Packet serialization/deserialization
//! │   ├── factory     # Packet construction
//! │   ├── block       # Block numbering and block-sized reads
//! │   └── socket      # Per-transfer UDP socket
//! │
//! └── client/         # TFTP client
//!     ├── client      # Facade and worker pool
//!     ├── upload      # WRQ state machine
//!     ├── download    # RRQ state machine
//!     ├── session     # Shared receive/retry loop
//!     ├── retry       # Timeout budget
//!     ├── sink        # Log and status callbacks
//!     └── config      # Client configuration
//! ```
//!
//! ## Usage Examples
//!
//! ### Blocking transfer without the facade
//!
//! ```rust,no_run
//! use tftpc::tftp::client::{ClientConfig, Logger, SessionContext, resolve_server, upload};
//! use std::path::Path;
//!
//! let logger = Logger::new(|line: &str| println!("{line}"));
//! let ctx = SessionContext::new(ClientConfig::default(), logger);
//! let server = resolve_server("192.168.1.100", 69).unwrap();
//! let stats = upload(&ctx, server, Path::new("firmware.bin"), "firmware.bin").unwrap();
//! println!("sent {} bytes", stats.bytes);
//! ```

// Submodules
pub mod client;
pub mod core;
