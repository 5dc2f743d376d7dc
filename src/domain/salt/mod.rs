//! Per-user password salt

use async_trait::async_trait;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::user::UserId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Number of random bytes in a freshly generated salt
pub const SALT_LEN: usize = 32;

/// Random bytes mixed into a user's password hash
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Wrap existing salt bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Generate a fresh salt from the OS random number generator
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt([{} bytes])", self.0.len())
    }
}

/// Repository trait for per-user salts
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SaltRepository: Send + Sync {
    /// Get the salt stored for a user
    async fn get(&self, user_id: &UserId) -> Result<Option<Salt>, DomainError>;

    /// Store the salt for a user, failing with `Conflict` if one exists
    async fn insert(&self, user_id: &UserId, salt: Salt) -> Result<(), DomainError>;

    /// Delete a user's salt. Idempotent: returns whether a record was removed
    async fn delete(&self, user_id: &UserId) -> Result<bool, DomainError>;
}
