//! TFTP client implementation
//!
//! - `client`: Client facade, owns the worker pool and the sinks
//! - `upload` / `download`: The two stop-and-wait transfer engines
//! - `session`: Socket, peer and retry handling shared by both engines
//! - `config`: Client configuration
//! - `sink`: Log and status callbacks

#[allow(clippy::module_inception)]
mod client;
mod config;
mod download;
mod error;
mod retry;
mod session;
mod sink;
mod upload;

pub use client::Client;
pub use config::{CONFIG_ENV, ClientConfig, DEFAULT_CONFIG_FILE};
pub use download::download;
pub use error::TransferError;
pub use retry::Retry;
pub use session::{Direction, SessionContext, TransferStats, resolve_server};
pub use sink::{ClientStatus, LogSink, Logger, StatusSink};
pub use upload::upload;
