//! Cryptographic collaborator traits
//!
//! The authentication core never touches a primitive directly; it hashes
//! passwords, issues keypairs and protects stored fields through these
//! traits.

use async_trait::async_trait;

use crate::domain::keypair::{GeneratedKeypair, RsaParameters};
use crate::domain::salt::Salt;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Output of hashing a password under a freshly generated salt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub hash: String,
    pub salt: Salt,
}

/// Salted password hashing
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HashService: Send + Sync {
    /// Hash a password under an existing salt. Deterministic for a given
    /// (password, salt) pair.
    async fn hash(&self, password: &str, salt: &Salt) -> Result<String, DomainError>;

    /// Hash a password under a newly generated salt and return both
    async fn hash_new(&self, password: &str) -> Result<HashedPassword, DomainError>;
}

/// RSA keypair issuance and key-exchange XML decoding
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EncryptionService: Send + Sync {
    /// Generate a fresh keypair: the public-only and the full XML encodings
    async fn generate_keypair(&self) -> Result<GeneratedKeypair, DomainError>;

    /// Decode a key-exchange XML document
    fn parse_key_xml(&self, xml: &str) -> Result<RsaParameters, DomainError>;
}

/// Reversible protection of a single stored field
///
/// Encryption must be deterministic so the stored form of a value can be
/// used as a lookup key.
#[cfg_attr(test, automock)]
pub trait StringEncryptionService: Send + Sync {
    fn encrypt_string(&self, plaintext: &str) -> Result<String, DomainError>;

    fn decrypt_string(&self, ciphertext: &str) -> Result<String, DomainError>;
}
