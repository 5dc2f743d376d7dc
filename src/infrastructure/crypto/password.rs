//! Salted password hashing using Argon2id

use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::domain::crypto::{HashService, HashedPassword};
use crate::domain::salt::Salt;
use crate::domain::DomainError;

/// Argon2id memory cost in KiB (19 MiB)
pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;

/// Argon2id iteration count
pub const DEFAULT_ITERATIONS: u32 = 2;

/// Argon2id parallelism
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Length of the derived hash in bytes
pub const HASH_LEN: usize = 32;

/// Argon2id hash service
///
/// The salt lives in its own repository, so the stored value is the bare
/// derived hash (base64) rather than a PHC string.
#[derive(Debug, Clone)]
pub struct Argon2HashService {
    params: Params,
}

impl Argon2HashService {
    /// Create a hasher with the default cost parameters
    pub fn new() -> Result<Self, DomainError> {
        Self::with_params(DEFAULT_MEMORY_KIB, DEFAULT_ITERATIONS, DEFAULT_PARALLELISM)
    }

    /// Create a hasher with explicit cost parameters
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, DomainError> {
        let params = Params::new(memory_kib, iterations, parallelism, Some(HASH_LEN))
            .map_err(|e| DomainError::configuration(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self { params })
    }

    fn hash_blocking(params: Params, password: &[u8], salt: &[u8]) -> Result<String, DomainError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut output = [0u8; HASH_LEN];
        argon2
            .hash_password_into(password, salt, &mut output)
            .map_err(|e| DomainError::crypto(format!("Failed to hash password: {}", e)))?;

        Ok(STANDARD.encode(output))
    }
}

#[async_trait]
impl HashService for Argon2HashService {
    async fn hash(&self, password: &str, salt: &Salt) -> Result<String, DomainError> {
        let params = self.params.clone();
        let password = password.as_bytes().to_vec();
        let salt = salt.as_bytes().to_vec();

        tokio::task::spawn_blocking(move || Self::hash_blocking(params, &password, &salt))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))?
    }

    async fn hash_new(&self, password: &str) -> Result<HashedPassword, DomainError> {
        let salt = Salt::generate();
        let hash = self.hash(password, &salt).await?;

        Ok(HashedPassword { hash, salt })
    }
}
