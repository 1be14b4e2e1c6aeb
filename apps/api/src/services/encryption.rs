//! At-rest encryption for Spotify tokens held in sessions
//!
//! AES-256-GCM with a key derived from `JWT_SECRET` via HKDF-SHA256. Stored
//! values are `nonce (12 bytes) || ciphertext || tag (16 bytes)`.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use hkdf::Hkdf;
use sha2::Sha256;
use thiserror::Error;

const NONCE_SIZE: usize = 12;

/// Domain separation for HKDF
const HKDF_SALT: &[u8] = b"museboxd-token-encryption-v1";
const HKDF_INFO: &[u8] = b"spotify-session-tokens";

#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("ciphertext too short: expected at least {NONCE_SIZE} bytes for nonce")]
    CiphertextTooShort,

    #[error("decrypted data is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Encrypts provider tokens before they reach the sessions table
#[derive(Clone)]
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    /// Build the service with a key derived from the signing secret
    pub fn new(secret: &str) -> Result<Self, EncryptionError> {
        let key = Self::derive_key(secret)?;
        Ok(Self {
            cipher: Aes256Gcm::new(&key.into()),
        })
    }

    fn derive_key(secret: &str) -> Result<[u8; 32], EncryptionError> {
        let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), secret.as_bytes());
        let mut key = [0u8; 32];
        hk.expand(HKDF_INFO, &mut key)
            .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;
        Ok(key)
    }

    /// Encrypt with a fresh random nonce
    pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        aes_gcm::aead::rand_core::RngCore::fill_bytes(&mut OsRng, &mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| EncryptionError::Encryption(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend(ciphertext);
        Ok(sealed)
    }

    /// Decrypt a value produced by [`EncryptionService::encrypt`]
    pub fn decrypt(&self, sealed: &[u8]) -> Result<String, EncryptionError> {
        if sealed.len() < NONCE_SIZE {
            return Err(EncryptionError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| EncryptionError::Decryption(e.to_string()))?;

        Ok(String::from_utf8(plaintext)?)
    }
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService")
            .field("cipher", &"[REDACTED]")
            .finish()
    }
}
