//! `config show` and `config set`.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use localpass_vault::Preferences;

use super::to_json;
use crate::cli::{ConfigAction, ConfigSetArgs};

/// Reads `preferences.json` again rather than using the startup copy, so the
/// file on disk is what gets merged and written.
pub(super) fn config(action: &ConfigAction, data_dir: &Path) -> anyhow::Result<Value> {
    let prefs = Preferences::load(data_dir);
    match action {
        ConfigAction::Show => to_json(&prefs),
        ConfigAction::Set(args) => set(prefs, args, data_dir),
    }
}

fn set(mut prefs: Preferences, args: &ConfigSetArgs, data_dir: &Path) -> anyhow::Result<Value> {
    if let Some(file) = &args.database_file {
        prefs.database_file.clone_from(file);
    }
    if let Some(filter) = &args.log_filter {
        prefs.log_filter.clone_from(filter);
    }
    if args.clear_backup_dir {
        prefs.backup_dir = None;
    } else if let Some(dir) = &args.backup_dir {
        prefs.backup_dir = Some(dir.clone());
    }

    let generator = &mut prefs.generator;
    generator.length = args.generator_length.unwrap_or(generator.length);
    generator.uppercase = args.generator_uppercase.unwrap_or(generator.uppercase);
    generator.lowercase = args.generator_lowercase.unwrap_or(generator.lowercase);
    generator.digits = args.generator_digits.unwrap_or(generator.digits);
    generator.symbols = args.generator_symbols.unwrap_or(generator.symbols);

    fs::create_dir_all(data_dir)
        .with_context(|| format!("cannot create data directory {}", data_dir.display()))?;
    prefs.save(data_dir)?;
    tracing::info!(data_dir = %data_dir.display(), "preferences saved");
    to_json(&prefs)
}
