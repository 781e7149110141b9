//! `localpass`: command-line front end for the LocalPass store.

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

mod cli;
mod commands;
mod store;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;

use localpass_crypto_core::memory::disable_core_dumps;
use localpass_vault::Preferences;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let prefs = Preferences::load(&cli.data_dir);

    if let Err(e) = telemetry::init_tracing(&prefs.log_filter) {
        eprintln!("warning: {e:#}");
    }
    if let Err(e) = disable_core_dumps() {
        tracing::warn!(error = %e, "could not disable core dumps");
    }
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting localpass");

    match commands::run(cli, &prefs).and_then(|out| print_json(&out)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(error = ?error, "command failed");
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
