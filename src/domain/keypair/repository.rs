//! Keypair repository trait

use async_trait::async_trait;

use super::entity::Keypair;
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository trait for per-user keypairs
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeypairRepository: Send + Sync {
    /// Get the keypair stored for a user
    async fn get(&self, user_id: &UserId) -> Result<Option<Keypair>, DomainError>;

    /// Store a keypair, failing with `Conflict` if the user already has one
    async fn insert(&self, keypair: Keypair) -> Result<(), DomainError>;

    /// Delete a user's keypair. Idempotent: returns whether a record was removed
    async fn delete(&self, user_id: &UserId) -> Result<bool, DomainError>;
}
