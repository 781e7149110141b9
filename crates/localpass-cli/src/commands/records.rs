//! `logins`, `notes` and `cards` subcommands.

use serde_json::{json, Value};

use localpass_vault::{
    add_card, add_login, add_note, delete_card, delete_login, delete_note, list_cards,
    list_logins, list_notes, update_card, update_login, update_note,
};

use super::to_json;
use crate::cli::{CardAction, Credentials, LoginAction, NoteAction};
use crate::store::Store;

pub(super) fn logins(
    store: &Store,
    auth: &Credentials,
    action: LoginAction,
) -> anyhow::Result<Value> {
    let user = store.login(auth)?;
    let (conn, env) = (store.conn(), store.envelope());
    match action {
        LoginAction::Add(fields) => to_json(&add_login(conn, env, user.id, &fields.into())?),
        LoginAction::List => to_json(&list_logins(conn, env, user.id)?),
        LoginAction::Update { id, fields } => {
            update_login(conn, env, user.id, id, &fields.into())?;
            Ok(json!({ "updated": id }))
        }
        LoginAction::Delete { id } => {
            delete_login(conn, user.id, id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}

pub(super) fn notes(store: &Store, auth: &Credentials, action: NoteAction) -> anyhow::Result<Value> {
    let user = store.login(auth)?;
    let (conn, env) = (store.conn(), store.envelope());
    match action {
        NoteAction::Add(fields) => to_json(&add_note(conn, env, user.id, &fields.into())?),
        NoteAction::List => to_json(&list_notes(conn, env, user.id)?),
        NoteAction::Update { id, fields } => {
            update_note(conn, env, user.id, id, &fields.into())?;
            Ok(json!({ "updated": id }))
        }
        NoteAction::Delete { id } => {
            delete_note(conn, user.id, id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}

pub(super) fn cards(store: &Store, auth: &Credentials, action: CardAction) -> anyhow::Result<Value> {
    let user = store.login(auth)?;
    let (conn, env) = (store.conn(), store.envelope());
    match action {
        CardAction::Add(fields) => to_json(&add_card(conn, env, user.id, &fields.into())?),
        CardAction::List => to_json(&list_cards(conn, env, user.id)?),
        CardAction::Update { id, fields } => {
            update_card(conn, env, user.id, id, &fields.into())?;
            Ok(json!({ "updated": id }))
        }
        CardAction::Delete { id } => {
            delete_card(conn, user.id, id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}
