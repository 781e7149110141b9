//! `export` and `import`.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use serde_json::{json, Value};

use localpass_crypto_core::backup::BackupContainer;
use localpass_vault::{backup_file_name, export_backup, import_backup, Preferences};

use super::to_json;
use crate::cli::{ExportArgs, ImportArgs};
use crate::store::Store;

pub(super) fn export(
    store: &Store,
    args: &ExportArgs,
    data_dir: &Path,
    prefs: &Preferences,
) -> anyhow::Result<Value> {
    let user = store.login(&args.auth)?;
    let sections = args.sections();
    let container = export_backup(
        store.conn(),
        store.envelope(),
        &user,
        sections,
        &args.passphrase,
    )?;

    let path = match &args.output {
        Some(path) => path.clone(),
        None => {
            let dir = prefs.backup_dir_or(data_dir);
            fs::create_dir_all(&dir)
                .with_context(|| format!("cannot create backup directory {}", dir.display()))?;
            dir.join(backup_file_name(&user.username, Utc::now().date_naive()))
        }
    };
    fs::write(&path, container.to_json()?)
        .with_context(|| format!("cannot write backup to {}", path.display()))?;

    Ok(json!({ "file": path, "sections": sections }))
}

pub(super) fn import(store: &Store, args: &ImportArgs) -> anyhow::Result<Value> {
    let user = store.login(&args.auth)?;
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read backup {}", args.file.display()))?;
    let container = BackupContainer::from_json(&text)?;
    to_json(&import_backup(
        store.conn(),
        store.envelope(),
        user.id,
        &container,
        &args.passphrase,
    )?)
}
