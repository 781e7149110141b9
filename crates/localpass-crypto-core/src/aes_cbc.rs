//! AES-CBC with PKCS#7 padding over 128/192/256-bit keys.
//!
//! Shared by the field envelope (key size picked by the configured key) and
//! the backup codec (always AES-256).

use aes::cipher::block_padding::{Pkcs7, UnpadError};
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};

use crate::error::CryptoError;
use crate::memory::SecretBytes;

/// AES block size and CBC IV length in bytes.
pub const IV_LEN: usize = 16;

/// An AES key whose size selects the cipher variant.
pub(crate) enum AesKey {
    Aes128(SecretBytes<16>),
    Aes192(SecretBytes<24>),
    Aes256(SecretBytes<32>),
}

impl AesKey {
    /// Build from raw key material.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyMaterial` unless `bytes` is 16, 24 or
    /// 32 bytes long.
    pub(crate) fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        match bytes.len() {
            16 => Ok(Self::Aes128(SecretBytes::from_slice(bytes)?)),
            24 => Ok(Self::Aes192(SecretBytes::from_slice(bytes)?)),
            32 => Ok(Self::Aes256(SecretBytes::from_slice(bytes)?)),
            n => Err(CryptoError::InvalidKeyMaterial(format!(
                "AES key must be 16, 24 or 32 bytes, got {n}"
            ))),
        }
    }

    /// Key length in bytes.
    pub(crate) const fn len(&self) -> usize {
        match self {
            Self::Aes128(_) => 16,
            Self::Aes192(_) => 24,
            Self::Aes256(_) => 32,
        }
    }

    /// Encrypt and pad. Infallible once the key exists.
    pub(crate) fn encrypt(&self, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Vec<u8> {
        let iv = GenericArray::from_slice(iv);
        match self {
            Self::Aes128(k) => cbc::Encryptor::<Aes128>::new(GenericArray::from_slice(k.expose()), iv)
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            Self::Aes192(k) => cbc::Encryptor::<Aes192>::new(GenericArray::from_slice(k.expose()), iv)
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            Self::Aes256(k) => cbc::Encryptor::<Aes256>::new(GenericArray::from_slice(k.expose()), iv)
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        }
    }

    /// Decrypt and strip padding.
    ///
    /// # Errors
    ///
    /// Returns [`UnpadError`] when the ciphertext is not a whole number of
    /// blocks or the final block does not carry valid PKCS#7 padding. With
    /// CBC this is the usual symptom of a wrong key.
    pub(crate) fn decrypt(&self, iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, UnpadError> {
        let iv = GenericArray::from_slice(iv);
        match self {
            Self::Aes128(k) => cbc::Decryptor::<Aes128>::new(GenericArray::from_slice(k.expose()), iv)
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            Self::Aes192(k) => cbc::Decryptor::<Aes192>::new(GenericArray::from_slice(k.expose()), iv)
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            Self::Aes256(k) => cbc::Decryptor::<Aes256>::new(GenericArray::from_slice(k.expose()), iv)
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        }
    }
}
