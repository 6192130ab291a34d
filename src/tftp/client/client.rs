use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tokio::runtime::Runtime;

use super::config::ClientConfig;
use super::download::download;
use super::error::TransferError;
use super::session::{Direction, SessionContext, TransferStats, resolve_server};
use super::sink::{ClientStatus, LogSink, Logger, StatusSink};
use super::upload::upload;

/// TFTP client
///
/// Supports file upload (PUT) and download (GET) operations. Every transfer
/// runs on its own worker thread; progress is reported only through the log
/// and status sinks.
///
/// # Example
///
/// ```rust,no_run
/// use tftpc::tftp::client::{Client, ClientConfig, ClientStatus};
/// use std::path::Path;
///
/// let client = Client::new(
///     ClientConfig::default(),
///     |line: &str| println!("{line}"),
///     |status: ClientStatus| println!("[{status}]"),
/// )
/// .unwrap();
///
/// // Download file
/// client.download("192.168.1.100", Path::new("local.txt"), "remote.txt");
///
/// // Upload file
/// client.upload("192.168.1.100", Path::new("local.txt"), "remote.txt");
/// ```
pub struct Client {
    config: ClientConfig,
    logger: Logger,
    status: Arc<dyn StatusSink>,
    running: Arc<AtomicBool>,
    pool: Mutex<Option<Runtime>>,
}

impl Client {
    /// Create a new TFTP client and its worker pool
    pub fn new(
        config: ClientConfig,
        log_sink: impl LogSink + 'static,
        status_sink: impl StatusSink + 'static,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        // Sessions run on the blocking pool, which grows per transfer and
        // reaps idle threads; the async side has nothing to do.
        let pool = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("tftp-session")
            .enable_all()
            .build()
            .context("Failed to create worker pool")?;
        log::info!(
            "TFTP client ready (port {}, timeout {:?}, retries {})",
            config.server_port,
            config.timeout,
            config.max_retries
        );

        Ok(Self {
            config,
            logger: Logger::new(log_sink),
            status: Arc::new(status_sink),
            running: Arc::new(AtomicBool::new(true)),
            pool: Mutex::new(Some(pool)),
        })
    }

    /// Upload a file to the server (WRQ - Write Request)
    ///
    /// # Arguments
    ///
    /// * `server` - Server host or IP, optionally with `:port`
    /// * `local_file` - Local file path
    /// * `remote_file` - File name on the server
    pub fn upload(&self, server: &str, local_file: &Path, remote_file: &str) {
        self.submit(Direction::Upload, server, local_file, remote_file);
    }

    /// Download a file from the server (RRQ - Read Request)
    ///
    /// # Arguments
    ///
    /// * `server` - Server host or IP, optionally with `:port`
    /// * `local_file` - Local save path
    /// * `remote_file` - File name on the server
    pub fn download(&self, server: &str, local_file: &Path, remote_file: &str) {
        self.submit(Direction::Download, server, local_file, remote_file);
    }

    /// Stop accepting work and tear the pool down without waiting
    ///
    /// Running uploads stop before their next block; a receive already in
    /// progress is not interrupted. Queued transfers are dropped. Calling
    /// this again does nothing.
    pub fn dispose(&self) {
        let ctx = self.context();
        ctx.stop();

        let pool = self.pool.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(pool) = pool {
            log::info!("Disposing TFTP client");
            pool.shutdown_background();
        }
    }

    fn context(&self) -> SessionContext {
        SessionContext::with_flag(
            self.config.clone(),
            self.logger.clone(),
            self.running.clone(),
        )
    }

    fn submit(&self, direction: Direction, server: &str, local_file: &Path, remote_file: &str) {
        self.status.status_changed(ClientStatus::Dealing);
        let ready = ReadyGuard(self.status.clone());

        let local_name = local_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| local_file.display().to_string());
        match direction {
            Direction::Upload => self
                .logger
                .line(format!("Upload: {} -> {}", local_name, remote_file)),
            Direction::Download => self
                .logger
                .line(format!("Download: {} -> {}", remote_file, local_name)),
        }

        let pool = self.pool.lock().unwrap_or_else(|e| e.into_inner());
        let Some(pool) = pool.as_ref() else {
            self.logger
                .line(format!("{}: err: client has been disposed", direction));
            return;
        };

        let job = Job {
            ctx: self.context(),
            direction,
            server: server.to_string(),
            local_file: local_file.to_path_buf(),
            remote_file: remote_file.to_string(),
        };
        pool.spawn_blocking(move || {
            let _ready = ready;
            job.run();
        });
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Emits `Ready` when dropped: after the session returns, unwinds, or is
/// discarded unstarted by pool shutdown
struct ReadyGuard(Arc<dyn StatusSink>);

impl Drop for ReadyGuard {
    fn drop(&mut self) {
        self.0.status_changed(ClientStatus::Ready);
    }
}

/// One queued transfer
struct Job {
    ctx: SessionContext,
    direction: Direction,
    server: String,
    local_file: PathBuf,
    remote_file: String,
}

impl Job {
    /// Session boundary: every failure ends here as a log line
    fn run(self) {
        let result = resolve_server(&self.server, self.ctx.config.server_port)
            .and_then(|addr| self.transfer(addr));

        match result {
            Ok(stats) => log::info!(
                "{} of {} finished: {} bytes in {} blocks",
                self.direction,
                self.remote_file,
                stats.bytes,
                stats.blocks
            ),
            Err(e) => {
                log::warn!("{} of {} failed: {}", self.direction, self.remote_file, e);
                let line = format!("{}: err: {}", self.direction, e);
                self.ctx.logger.line(line);
            }
        }
    }

    fn transfer(&self, addr: SocketAddr) -> Result<TransferStats, TransferError> {
        let (ctx, local, remote) = (&self.ctx, &self.local_file, &self.remote_file);
        match self.direction {
            Direction::Upload => upload(ctx, addr, local, remote),
            Direction::Download => download(ctx, addr, local, remote),
        }
    }
}
