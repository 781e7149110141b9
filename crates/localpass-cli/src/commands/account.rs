//! `register`, `users`, `delete-account`, `questions`, `recover`.

use serde_json::{json, Value};

use localpass_vault::{
    delete_user, list_users, register_user, reset_password, security_questions,
    verify_security_answers, Registration,
};

use super::to_json;
use crate::cli::{Credentials, RecoverArgs, RegisterArgs};
use crate::store::Store;

pub(super) fn register(store: &Store, args: &RegisterArgs) -> anyhow::Result<Value> {
    let reg = Registration {
        username: args.auth.user.clone(),
        password: args.auth.password.clone(),
        question1: args.question1.clone(),
        answer1: args.answer1.clone(),
        question2: args.question2.clone(),
        answer2: args.answer2.clone(),
    };
    to_json(&register_user(store.conn(), store.envelope(), &reg)?)
}

pub(super) fn users(store: &Store) -> anyhow::Result<Value> {
    to_json(&list_users(store.conn())?)
}

pub(super) fn delete(store: &Store, auth: &Credentials) -> anyhow::Result<Value> {
    let user = store.login(auth)?;
    delete_user(store.conn(), user.id)?;
    Ok(json!({ "deleted": user.id }))
}

pub(super) fn questions(store: &Store, username: &str) -> anyhow::Result<Value> {
    to_json(&security_questions(store.conn(), username)?)
}

/// Verify both answers, then set the new password.
pub(super) fn recover(store: &Store, args: &RecoverArgs) -> anyhow::Result<Value> {
    verify_security_answers(
        store.conn(),
        store.envelope(),
        &args.user,
        &args.answer1,
        &args.answer2,
    )?;
    reset_password(store.conn(), &args.user, &args.new_password)?;
    Ok(json!({ "reset": args.user }))
}
