//! In-memory keypair repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::keypair::{Keypair, KeypairRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of KeypairRepository
#[derive(Debug, Default)]
pub struct InMemoryKeypairRepository {
    keypairs: Arc<RwLock<HashMap<String, Keypair>>>,
    should_fail: Arc<RwLock<bool>>,
    fail_deletes: Arc<RwLock<bool>>,
}

impl InMemoryKeypairRepository {
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

    /// Number of stored keypairs
    pub async fn len(&self) -> usize {
        self.keypairs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keypairs.read().await.is_empty()
    }

    async fn check_should_fail(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::storage("Keypair repository unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeypairRepository for InMemoryKeypairRepository {
    async fn get(&self, user_id: &UserId) -> Result<Option<Keypair>, DomainError> {
        self.check_should_fail().await?;
        let keypairs = self.keypairs.read().await;
        Ok(keypairs.get(user_id.as_str()).cloned())
    }

    async fn insert(&self, keypair: Keypair) -> Result<(), DomainError> {
        self.check_should_fail().await?;
        let mut keypairs = self.keypairs.write().await;
        let user_id = keypair.user_id().as_str().to_string();

        if keypairs.contains_key(&user_id) {
            return Err(DomainError::conflict(format!(
                "Keypair for user '{}' already exists",
                user_id
            )));
        }

        keypairs.insert(user_id, keypair);
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<bool, DomainError> {
        self.check_should_fail().await?;
        if *self.fail_deletes.read().await {
            return Err(DomainError::storage("Keypair delete failed"));
        }

        let mut keypairs = self.keypairs.write().await;
        Ok(keypairs.remove(user_id.as_str()).is_some())
    }
}
