//! Field encryption using ChaCha20-Poly1305 with a synthetic nonce
//!
//! The nonce is derived from the plaintext with HMAC-SHA256, so equal
//! inputs encrypt to equal outputs and the stored form can be looked up
//! directly. Stored value: base64(nonce || ciphertext || tag).

use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::{aead::Aead, ChaCha20Poly1305, Key, KeyInit, Nonce};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::domain::crypto::StringEncryptionService;
use crate::domain::DomainError;

type HmacSha256 = Hmac<Sha256>;

/// Key length for ChaCha20-Poly1305 (32 bytes)
pub const KEY_LEN: usize = 32;

/// Nonce length for ChaCha20-Poly1305 (12 bytes)
pub const NONCE_LEN: usize = 12;

const NONCE_KEY_LABEL: &[u8] = b"cyber-auth/field-nonce";

/// Deterministic field cipher
#[derive(Clone)]
pub struct ChaChaStringEncryptionService {
    cipher_key: [u8; KEY_LEN],
    nonce_key: [u8; KEY_LEN],
}

impl ChaChaStringEncryptionService {
    /// Create a cipher from a 32-byte key
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self {
            cipher_key: key,
            nonce_key: derive_nonce_key(&key),
        }
    }

    /// Create a cipher from a base64-encoded 32-byte key
    pub fn from_base64(encoded: &str) -> Result<Self, DomainError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| DomainError::configuration(format!("Invalid encryption key: {}", e)))?;

        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            DomainError::configuration(format!(
                "Encryption key must be {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            ))
        })?;

        Ok(Self::new(key))
    }

    /// Create a cipher with a random, process-local key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self::new(key)
    }

    fn nonce_for(&self, plaintext: &str) -> Result<[u8; NONCE_LEN], DomainError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.nonce_key)
            .map_err(|e| DomainError::crypto(format!("Invalid nonce key: {}", e)))?;
        mac.update(plaintext.as_bytes());
        let digest = mac.finalize().into_bytes();

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&digest[..NONCE_LEN]);
        Ok(nonce)
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.cipher_key))
    }
}

impl std::fmt::Debug for ChaChaStringEncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaChaStringEncryptionService")
            .field("key", &"[hidden]")
            .finish()
    }
}

impl StringEncryptionService for ChaChaStringEncryptionService {
    fn encrypt_string(&self, plaintext: &str) -> Result<String, DomainError> {
        let nonce = self.nonce_for(plaintext)?;

        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| DomainError::crypto(format!("Encryption failed: {}", e)))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(payload))
    }

    fn decrypt_string(&self, ciphertext: &str) -> Result<String, DomainError> {
        let payload = STANDARD
            .decode(ciphertext)
            .map_err(|e| DomainError::decode("ciphertext", e.to_string()))?;

        if payload.len() < NONCE_LEN {
            return Err(DomainError::crypto("Ciphertext is shorter than its nonce"));
        }

        let (nonce, sealed) = payload.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| DomainError::crypto("Failed to decrypt field (wrong key or tampered value)"))?;

        String::from_utf8(plaintext)
            .map_err(|e| DomainError::crypto(format!("Decrypted field is not UTF-8: {}", e)))
    }
}

fn derive_nonce_key(key: &[u8; KEY_LEN]) -> [u8; KEY_LEN] {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(NONCE_KEY_LABEL);

    let mut nonce_key = [0u8; KEY_LEN];
    nonce_key.copy_from_slice(&mac.finalize().into_bytes());
    nonce_key
}
