//! User repository trait

use async_trait::async_trait;

use super::entity::{User, UserId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository trait for user storage
///
/// Implementations own their concurrency control; in particular two
/// concurrent inserts must not both claim the same email.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by the stored form of their email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user, failing with `Conflict` on a duplicate id or email
    async fn insert(&self, user: User) -> Result<(), DomainError>;

    /// Delete a user. Idempotent: returns whether a record was removed
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;
}
