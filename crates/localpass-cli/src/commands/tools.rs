//! `generate` and `health`.

use serde_json::{json, Value};

use localpass_crypto_core::password::generate_password;
use localpass_vault::{analyze_logins, evaluate_password_strength, list_logins, Preferences};

use super::to_json;
use crate::cli::{Credentials, GenerateArgs};
use crate::store::Store;

/// Generate a password from the preference defaults, overridden by flags.
pub(super) fn generate(args: &GenerateArgs, prefs: &Preferences) -> anyhow::Result<Value> {
    let mut charsets = prefs.generator.charsets();
    charsets.uppercase &= !args.no_uppercase;
    charsets.lowercase &= !args.no_lowercase;
    charsets.digits &= !args.no_digits;
    charsets.symbols &= !args.no_symbols;

    let length = args.length.unwrap_or(prefs.generator.length);
    let password = generate_password(length, &charsets)?;
    let strength = evaluate_password_strength(&password);
    Ok(json!({ "password": password, "strength": strength }))
}

pub(super) fn health(store: &Store, auth: &Credentials) -> anyhow::Result<Value> {
    let user = store.login(auth)?;
    let logins = list_logins(store.conn(), store.envelope(), user.id)?;
    to_json(&analyze_logins(&logins))
}
