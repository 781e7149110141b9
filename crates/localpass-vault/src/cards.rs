//! Payment cards.
//!
//! Card number and CVV are enveloped; cardholder, expiry and the display
//! gradient are plaintext. The gradient is chosen once at creation and is
//! left alone by [`update_card`].

use std::fmt;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use localpass_crypto_core::envelope::{CipherEnvelope, EncryptedField};

use crate::error::{ensure_changed, require, VaultError};

/// A decrypted card.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub gradient: String,
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("id", &self.id)
            .field("cardholder_name", &self.cardholder_name)
            .field("card_number", &"***")
            .field("cvv", &"***")
            .finish_non_exhaustive()
    }
}

/// Fields for creating or replacing a card. All are required on add;
/// `gradient` is ignored on update.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    #[serde(default)]
    pub gradient: String,
}

impl CardInput {
    fn validate(&self, with_gradient: bool) -> Result<(), VaultError> {
        require("cardholderName", &self.cardholder_name)?;
        require("cardNumber", &self.card_number)?;
        require("expiryMonth", &self.expiry_month)?;
        require("expiryYear", &self.expiry_year)?;
        require("cvv", &self.cvv)?;
        if with_gradient {
            require("gradient", &self.gradient)?;
        }
        Ok(())
    }
}

/// Borrowed, nullable view of one card row for inserts.
pub(crate) struct CardRow<'a> {
    pub cardholder_name: Option<&'a str>,
    pub card_number: Option<&'a str>,
    pub expiry_month: Option<&'a str>,
    pub expiry_year: Option<&'a str>,
    pub cvv: Option<&'a str>,
    pub gradient: Option<&'a str>,
}

pub(crate) fn insert_card(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    card: &CardRow<'_>,
) -> rusqlite::Result<i64> {
    let number = envelope.encrypt(card.card_number);
    let cvv = envelope.encrypt(card.cvv);
    conn.execute(
        "INSERT INTO cards (user_id, cardholder_name, card_number_iv, card_number_content, \
         expiry_month, expiry_year, cvv_iv, cvv_content, gradient) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            user_id,
            card.cardholder_name,
            number.iv,
            number.content,
            card.expiry_month,
            card.expiry_year,
            cvv.iv,
            cvv.content,
            card.gradient,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Add a card for `user_id`.
///
/// # Errors
///
/// - [`VaultError::Validation`] if any field is empty
/// - [`VaultError::Database`] if the INSERT fails
pub fn add_card(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    input: &CardInput,
) -> Result<Card, VaultError> {
    input.validate(true)?;
    let row = CardRow {
        cardholder_name: Some(&input.cardholder_name),
        card_number: Some(&input.card_number),
        expiry_month: Some(&input.expiry_month),
        expiry_year: Some(&input.expiry_year),
        cvv: Some(&input.cvv),
        gradient: Some(&input.gradient),
    };
    let id = insert_card(conn, envelope, user_id, &row)
        .map_err(|e| VaultError::Database(format!("failed to insert card: {e}")))?;
    Ok(Card {
        id,
        cardholder_name: input.cardholder_name.clone(),
        card_number: input.card_number.clone(),
        expiry_month: input.expiry_month.clone(),
        expiry_year: input.expiry_year.clone(),
        cvv: input.cvv.clone(),
        gradient: input.gradient.clone(),
    })
}

/// All cards of `user_id`, ordered by cardholder name (case-insensitive).
///
/// # Errors
///
/// Returns [`VaultError::Database`] if the query fails.
pub fn list_cards(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
) -> Result<Vec<Card>, VaultError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, cardholder_name, card_number_iv, card_number_content, \
             expiry_month, expiry_year, cvv_iv, cvv_content, gradient FROM cards \
             WHERE user_id = ?1 ORDER BY cardholder_name COLLATE NOCASE",
        )
        .map_err(|e| VaultError::Database(format!("failed to prepare card list: {e}")))?;

    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                EncryptedField::from_columns(row.get(2)?, row.get(3)?),
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                EncryptedField::from_columns(row.get(6)?, row.get(7)?),
                row.get::<_, String>(8)?,
            ))
        })
        .map_err(|e| VaultError::Database(format!("failed to list cards: {e}")))?;

    let mut result = Vec::new();
    for row in rows {
        let (id, cardholder_name, number, expiry_month, expiry_year, cvv, gradient) =
            row.map_err(|e| VaultError::Database(format!("row read error: {e}")))?;
        result.push(Card {
            id,
            cardholder_name,
            card_number: envelope.decrypt(Some(&number)),
            expiry_month,
            expiry_year,
            cvv: envelope.decrypt(Some(&cvv)),
            gradient,
        });
    }
    Ok(result)
}

/// Replace a card's fields except its gradient.
///
/// # Errors
///
/// - [`VaultError::Validation`] if any field other than gradient is empty
/// - [`VaultError::RecordNotFound`] if `id` does not belong to `user_id`
/// - [`VaultError::Database`] if the UPDATE fails
pub fn update_card(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    id: i64,
    input: &CardInput,
) -> Result<(), VaultError> {
    input.validate(false)?;
    let number = envelope.encrypt_str(&input.card_number);
    let cvv = envelope.encrypt_str(&input.cvv);
    let changed = conn
        .execute(
            "UPDATE cards SET cardholder_name = ?1, card_number_iv = ?2, \
             card_number_content = ?3, expiry_month = ?4, expiry_year = ?5, \
             cvv_iv = ?6, cvv_content = ?7 WHERE id = ?8 AND user_id = ?9",
            params![
                input.cardholder_name,
                number.iv,
                number.content,
                input.expiry_month,
                input.expiry_year,
                cvv.iv,
                cvv.content,
                id,
                user_id,
            ],
        )
        .map_err(|e| VaultError::Database(format!("failed to update card: {e}")))?;
    ensure_changed(changed, "card", id)
}

/// Delete a card.
///
/// # Errors
///
/// - [`VaultError::RecordNotFound`] if `id` does not belong to `user_id`
/// - [`VaultError::Database`] if the DELETE fails
pub fn delete_card(conn: &Connection, user_id: i64, id: i64) -> Result<(), VaultError> {
    let changed = conn
        .execute(
            "DELETE FROM cards WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )
        .map_err(|e| VaultError::Database(format!("failed to delete card: {e}")))?;
    ensure_changed(changed, "card", id)
}
