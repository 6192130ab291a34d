use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::tftp::core::MODE_OCTET;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "TFTPC_CONFIG";

/// Config file looked up in the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "tftpc.toml";

/// TFTP client configuration
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tftpc::tftp::client::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(2))
///     .with_retries(3);
/// assert_eq!(config.server_port, 69);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server used by front ends when none is given
    pub default_server: String,
    /// Port used when the server address carries none
    pub server_port: u16,
    /// Receive timeout for every wait
    pub timeout: Duration,
    /// Consecutive timeouts that abort a session
    pub max_retries: u32,
    /// Transfer mode (only octet is supported)
    pub mode: String,
}

impl ClientConfig {
    /// Create new client configuration
    ///
    /// # Arguments
    ///
    /// * `default_server` - Server host or IP used when none is given
    /// * `server_port` - Server port number (usually 69)
    pub fn new(default_server: impl Into<String>, server_port: u16) -> Self {
        Self {
            default_server: default_server.into(),
            server_port,
            timeout: Duration::from_secs(5),
            max_retries: 4,
            mode: MODE_OCTET.to_string(),
        }
    }

    /// Set timeout duration
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry budget
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the port used for servers given without one
    pub fn with_port(mut self, server_port: u16) -> Self {
        self.server_port = server_port;
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout.is_zero() {
            anyhow::bail!("timeout must be greater than zero");
        }
        if self.max_retries == 0 {
            anyhow::bail!("retries must be at least 1");
        }
        if self.mode != MODE_OCTET {
            anyhow::bail!("unsupported transfer mode '{}'", self.mode);
        }
        Ok(())
    }

    /// Load configuration from a TOML file, filling gaps with defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        let config = file.apply(Self::default());
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration: explicit path, then `TFTPC_CONFIG`, then
    /// `./tftpc.toml`, then defaults
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match config_path(explicit) {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 69)
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}

/// On-disk form of [`ClientConfig`]; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    server: Option<String>,
    port: Option<u16>,
    #[serde(with = "humantime_serde")]
    timeout: Option<Duration>,
    retries: Option<u32>,
    mode: Option<String>,
}

impl ConfigFile {
    fn apply(self, mut config: ClientConfig) -> ClientConfig {
        if let Some(server) = self.server {
            config.default_server = server;
        }
        if let Some(port) = self.port {
            config.server_port = port;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(retries) = self.retries {
            config.max_retries = retries;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.default_server, "127.0.0.1");
        assert_eq!(config.server_port, 69);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.mode, "octet");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_human_durations() {
        let config = ClientConfig::from_toml(
            r#"
            server = "10.0.0.5"
            port = 6969
            timeout = "750ms"
            retries = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.default_server, "10.0.0.5");
        assert_eq!(config.server_port, 6969);
        assert_eq!(config.timeout, Duration::from_millis(750));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ClientConfig::from_toml("retries = 6").unwrap();
        assert_eq!(config.max_retries, 6);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ClientConfig::from_toml("timeout = \"0s\"").is_err());
        assert!(ClientConfig::from_toml("retries = 0").is_err());
        assert!(ClientConfig::from_toml("mode = \"netascii\"").is_err());
        assert!(ClientConfig::from_toml("blksize = 1024").is_err());
    }

    #[test]
    #[serial]
    fn discover_prefers_explicit_path_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        let from_env = dir.path().join("env.toml");
        std::fs::File::create(&explicit)
            .unwrap()
            .write_all(b"retries = 7")
            .unwrap();
        std::fs::File::create(&from_env)
            .unwrap()
            .write_all(b"retries = 9")
            .unwrap();

        // SAFETY: serialized with every other test touching the environment
        unsafe { std::env::set_var(CONFIG_ENV, &from_env) };
        let env_config = ClientConfig::discover(None);
        let explicit_config = ClientConfig::discover(Some(&explicit));
        unsafe { std::env::remove_var(CONFIG_ENV) };

        assert_eq!(env_config.unwrap().max_retries, 9);
        assert_eq!(explicit_config.unwrap().max_retries, 7);
    }

    #[test]
    #[serial]
    fn discover_reports_missing_env_file() {
        unsafe { std::env::set_var(CONFIG_ENV, "/nonexistent/tftpc.toml") };
        let result = ClientConfig::discover(None);
        unsafe { std::env::remove_var(CONFIG_ENV) };

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config file"));
    }
}
