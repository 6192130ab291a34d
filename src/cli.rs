use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// Stop-and-wait TFTP client
#[derive(Debug, Parser)]
#[command(name = "tftpc", version, about)]
pub struct Cli {
    /// Config file (defaults to $TFTPC_CONFIG, then ./tftpc.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server host or IP, optionally with :port
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Server port used when --server carries none
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Receive timeout, e.g. 5s or 500ms
    #[arg(short, long, global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Consecutive timeouts before a transfer is abandoned
    #[arg(short, long, global = true)]
    pub retries: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a local file
    Put {
        /// Local file to send
        local: PathBuf,
        /// Name on the server (prompted for when omitted)
        remote: Option<String>,
    },
    /// Download a remote file
    Get {
        /// Name on the server
        remote: String,
        /// Where to save it (defaults to the remote name)
        local: Option<PathBuf>,
    },
}

/// Remote names are plain file names: non-empty, no path separators, no NUL
pub fn validate_remote_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Please enter remote file name".to_string());
    }
    if name.contains(['/', '\\']) {
        return Err("File name can not contain '/' or '\\'".to_string());
    }
    if name.contains('\0') {
        return Err("File name can not contain NUL".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_name_rules() {
        assert!(validate_remote_name("b.bin").is_ok());
        assert!(validate_remote_name("").is_err());
        assert!(validate_remote_name("dir/b.bin").is_err());
        assert!(validate_remote_name("dir\\b.bin").is_err());
        assert!(validate_remote_name("b\0.bin").is_err());
    }

    #[test]
    fn parses_put_with_globals() {
        let args = "tftpc put a.bin b.bin --server 10.0.0.1:6969 -t 500ms -vv";
        let cli = Cli::try_parse_from(args.split_whitespace()).unwrap();
        assert_eq!(cli.server.as_deref(), Some("10.0.0.1:6969"));
        assert_eq!(cli.timeout, Some(Duration::from_millis(500)));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Put { local, remote } => {
                assert_eq!(local, PathBuf::from("a.bin"));
                assert_eq!(remote.as_deref(), Some("b.bin"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_get_without_local() {
        let cli = Cli::try_parse_from(["tftpc", "get", "boot.img"]).unwrap();
        match cli.command {
            Command::Get { remote, local } => {
                assert_eq!(remote, "boot.img");
                assert_eq!(local, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
