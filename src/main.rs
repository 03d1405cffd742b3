use std::io;
use std::sync::Arc;

use anyhow::Context;

mod bridge;
mod config;
mod menus;
mod state;
mod terminal;
mod users;

#[cfg(test)]
mod testing;

use crate::bridge::ScriptBridge;
use crate::config::AppConfig;
use crate::state::Session;
use crate::terminal::{StdTerminal, Terminal};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "clinic_console=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    // Stdout belongs to the menus.
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
    }

    let config = AppConfig::from_env()?;
    let bridge = ScriptBridge::from_config(&config.service);
    let mut term = StdTerminal::default();
    if !bridge.is_available() {
        term.say("Warning: records service script not found; every action will fail until it is installed.");
    }

    let mut session = Session::from_parts(Arc::new(config), Arc::new(bridge));
    match menus::run(&mut session, &mut term) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            tracing::info!("input closed, exiting");
            Ok(())
        }
        Err(e) => Err(e).context("terminal session failed"),
    }
}
