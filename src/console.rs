//! Terminal sinks for the command line front end

use std::sync::mpsc::{Receiver, Sender};

use chrono::Local;
use crossterm::style::Stylize;
use tftpc::tftp::client::ClientStatus;

/// Log sink: one timestamped line per event on stdout
pub fn print_line(line: &str) {
    println!("[{}] {}", Local::now().format("%H:%M:%S%.3f"), line);
}

/// Status sink that prints each transition and forwards it to `tx`
pub fn status_printer(tx: Sender<ClientStatus>) -> impl Fn(ClientStatus) + Send + Sync {
    move |status| {
        let label = match status {
            ClientStatus::Dealing => status.to_string().yellow().bold(),
            ClientStatus::Ready => status.to_string().green().bold(),
        };
        eprintln!("status: {}", label);
        let _ = tx.send(status);
    }
}

/// Block until the client reports `Ready`
pub fn wait_ready(rx: &Receiver<ClientStatus>) {
    while let Ok(status) = rx.recv() {
        if status == ClientStatus::Ready {
            break;
        }
    }
}
