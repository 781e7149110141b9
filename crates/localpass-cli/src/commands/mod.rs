//! Command handlers. Each returns the JSON document printed on stdout.

mod account;
mod backup;
mod config;
mod records;
mod tools;

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use localpass_vault::Preferences;

use crate::cli::{Cli, Command};
use crate::store::Store;

/// Run one parsed invocation.
///
/// `generate` and `config` need no store; every other command validates
/// the envelope key and opens the store first.
///
/// # Errors
///
/// Propagates configuration, store and vault errors with context.
pub fn run(cli: Cli, prefs: &Preferences) -> anyhow::Result<Value> {
    let Cli {
        data_dir,
        encryption_key,
        command,
    } = cli;

    match &command {
        Command::Generate(args) => return tools::generate(args, prefs),
        Command::Config { action } => return config::config(action, &data_dir),
        _ => {}
    }

    let store = Store::open(&data_dir, prefs, encryption_key.as_deref())?;
    dispatch(&store, command, &data_dir, prefs)
}

/// Run a store-backed command.
///
/// # Errors
///
/// Propagates vault errors with context.
pub fn dispatch(
    store: &Store,
    command: Command,
    data_dir: &Path,
    prefs: &Preferences,
) -> anyhow::Result<Value> {
    match command {
        Command::Register(args) => account::register(store, &args),
        Command::Users => account::users(store),
        Command::Login(auth) => to_json(&store.login(&auth)?),
        Command::DeleteAccount(auth) => account::delete(store, &auth),
        Command::Questions { user } => account::questions(store, &user),
        Command::Recover(args) => account::recover(store, &args),
        Command::Logins { auth, action } => records::logins(store, &auth, action),
        Command::Notes { auth, action } => records::notes(store, &auth, action),
        Command::Cards { auth, action } => records::cards(store, &auth, action),
        Command::Export(args) => backup::export(store, &args, data_dir, prefs),
        Command::Import(args) => backup::import(store, &args),
        Command::Generate(args) => tools::generate(&args, prefs),
        Command::Health(auth) => tools::health(store, &auth),
        Command::Config { action } => config::config(&action, data_dir),
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}
