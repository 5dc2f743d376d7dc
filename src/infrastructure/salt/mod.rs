//! In-memory salt repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::salt::{Salt, SaltRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of SaltRepository
#[derive(Debug, Default)]
pub struct InMemorySaltRepository {
    salts: Arc<RwLock<HashMap<String, Salt>>>,
    should_fail: Arc<RwLock<bool>>,
    fail_deletes: Arc<RwLock<bool>>,
}

impl InMemorySaltRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with a storage error
    pub async fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().await = fail;
    }

    /// Make only deletes fail with a storage error
    pub async fn set_fail_deletes(&self, fail: bool) {
        *self.fail_deletes.write().await = fail;
    }

    /// Number of stored salts
    pub async fn len(&self) -> usize {
        self.salts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.salts.read().await.is_empty()
    }

    async fn check_should_fail(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::storage("Salt repository unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl SaltRepository for InMemorySaltRepository {
    async fn get(&self, user_id: &UserId) -> Result<Option<Salt>, DomainError> {
        self.check_should_fail().await?;
        let salts = self.salts.read().await;
        Ok(salts.get(user_id.as_str()).cloned())
    }

    async fn insert(&self, user_id: &UserId, salt: Salt) -> Result<(), DomainError> {
        self.check_should_fail().await?;
        let mut salts = self.salts.write().await;

        if salts.contains_key(user_id.as_str()) {
            return Err(DomainError::conflict(format!(
                "Salt for user '{}' already exists",
                user_id
            )));
        }

        salts.insert(user_id.as_str().to_string(), salt);
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<bool, DomainError> {
        self.check_should_fail().await?;
        if *self.fail_deletes.read().await {
            return Err(DomainError::storage("Salt delete failed"));
        }

        let mut salts = self.salts.write().await;
        Ok(salts.remove(user_id.as_str()).is_some())
    }
}
