mod cli;
mod console;

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::Result;
use clap::Parser;
use dialoguer::Input;
use tftpc::tftp::client::{Client, ClientConfig};

use cli::{Cli, Command, validate_remote_name};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(&cli)?;
    let server = cli
        .server
        .clone()
        .unwrap_or_else(|| config.default_server.clone());
    log::info!("Using server {}", server);

    let (tx, rx) = mpsc::channel();
    let client = Client::new(config, console::print_line, console::status_printer(tx))?;

    match cli.command {
        Command::Put { local, remote } => {
            if !local.is_file() {
                anyhow::bail!("Local file does not exist: {}", local.display());
            }
            let remote = match remote {
                Some(remote) => remote,
                None => prompt_remote_name(&local)?,
            };
            validate_remote_name(&remote).map_err(anyhow::Error::msg)?;
            client.upload(&server, &local, &remote);
        }
        Command::Get { remote, local } => {
            validate_remote_name(&remote).map_err(anyhow::Error::msg)?;
            let local = local.unwrap_or_else(|| PathBuf::from(&remote));
            client.download(&server, &local, &remote);
        }
    }

    console::wait_ready(&rx);
    client.dispose();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::discover(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    if let Some(retries) = cli.retries {
        config = config.with_retries(retries);
    }
    config.validate()?;
    Ok(config)
}

fn prompt_remote_name(local: &Path) -> Result<String> {
    let suggested = local
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = Input::<String>::new()
        .with_prompt("Remote file name")
        .default(suggested)
        .validate_with(|name: &String| validate_remote_name(name))
        .interact_text()?;
    Ok(name)
}
