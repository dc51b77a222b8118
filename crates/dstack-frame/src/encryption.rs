//! Encryption applied to attachment payloads before they leave the client.
//!
//! The default is [`NoEncryption`]. [`AesGcmEncryption`] seals each
//! attachment with AES-256-GCM under a fresh random nonce, which travels
//! base64-encoded in the attachment metadata.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use serde_json::{json, Map, Value};

/// Nonce size for AES-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Key size for AES-256.
const KEY_SIZE: usize = 32;

/// Errors that can occur while encrypting or decrypting payloads.
#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("decryption failed: {0}")]
    Decrypt(String),

    #[error("missing encryption metadata field '{0}'")]
    MissingMetadata(&'static str),

    #[error("invalid key length ({0} bytes, expected 32)")]
    InvalidKey(usize),
}

/// Ciphertext plus whatever the reader needs to decrypt it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Encrypted {
    pub data: Vec<u8>,
    pub metadata: Map<String, Value>,
}

/// Transform applied to encoded attachment bytes.
pub trait EncryptionMethod: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Encrypted, EncryptionError>;

    fn decrypt(
        &self,
        ciphertext: &[u8],
        metadata: &Map<String, Value>,
    ) -> Result<Vec<u8>, EncryptionError>;

    /// Frame-level description sent in the envelope; `None` for identity.
    fn info(&self) -> Option<Value>;
}

/// Identity transform: data passes through unchanged, no metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEncryption;

impl EncryptionMethod for NoEncryption {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Encrypted, EncryptionError> {
        Ok(Encrypted {
            data: plaintext.to_vec(),
            metadata: Map::new(),
        })
    }

    fn decrypt(
        &self,
        ciphertext: &[u8],
        _metadata: &Map<String, Value>,
    ) -> Result<Vec<u8>, EncryptionError> {
        Ok(ciphertext.to_vec())
    }

    fn info(&self) -> Option<Value> {
        None
    }
}

/// AES-256-GCM with a random nonce per payload.
#[derive(Clone)]
pub struct AesGcmEncryption {
    key: [u8; KEY_SIZE],
}

impl AesGcmEncryption {
    pub const METHOD: &'static str = "aes-256-gcm";

    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Build from a key slice, which must be exactly 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self, EncryptionError> {
        let key: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| EncryptionError::InvalidKey(key.len()))?;
        Ok(Self::new(key))
    }

    /// Build from a base64-encoded 32-byte key.
    pub fn from_base64(key: &str) -> Result<Self, EncryptionError> {
        let bytes = BASE64
            .decode(key.trim())
            .map_err(|err| EncryptionError::Encrypt(format!("invalid key encoding: {err}")))?;
        Self::from_slice(&bytes)
    }

    fn cipher(&self) -> Result<Aes256Gcm, EncryptionError> {
        Aes256Gcm::new_from_slice(&self.key).map_err(|_| EncryptionError::InvalidKey(KEY_SIZE))
    }
}

impl fmt::Debug for AesGcmEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmEncryption")
            .field("key", &format_args!("<redacted:{} bytes>", self.key.len()))
            .finish()
    }
}

impl EncryptionMethod for AesGcmEncryption {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Encrypted, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let data = self
            .cipher()?
            .encrypt(nonce, plaintext)
            .map_err(|err| EncryptionError::Encrypt(err.to_string()))?;

        let mut metadata = Map::new();
        metadata.insert("method".to_string(), Value::from(Self::METHOD));
        metadata.insert("nonce".to_string(), Value::from(BASE64.encode(nonce_bytes)));
        Ok(Encrypted { data, metadata })
    }

    fn decrypt(
        &self,
        ciphertext: &[u8],
        metadata: &Map<String, Value>,
    ) -> Result<Vec<u8>, EncryptionError> {
        let nonce_bytes = metadata
            .get("nonce")
            .and_then(Value::as_str)
            .ok_or(EncryptionError::MissingMetadata("nonce"))?;
        let nonce_bytes = BASE64
            .decode(nonce_bytes)
            .map_err(|err| EncryptionError::Decrypt(format!("invalid nonce encoding: {err}")))?;
        if nonce_bytes.len() != NONCE_SIZE {
            return Err(EncryptionError::Decrypt(format!(
                "nonce has {} bytes, expected {NONCE_SIZE}",
                nonce_bytes.len()
            )));
        }

        self.cipher()?
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext)
            .map_err(|err| EncryptionError::Decrypt(err.to_string()))
    }

    fn info(&self) -> Option<Value> {
        Some(json!({ "method": Self::METHOD }))
    }
}
