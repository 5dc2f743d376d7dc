//! User service: registration, login, deletion and keypair issuance
//!
//! The service holds no mutable state of its own. Every durable record lives
//! in the injected repositories, which do their own concurrency control.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::domain::crypto::{EncryptionService, HashService, HashedPassword, StringEncryptionService};
use crate::domain::keypair::{Keypair, KeypairRepository};
use crate::domain::salt::{Salt, SaltRepository};
use crate::domain::token::{Token, TokenClaims, TokenService};
use crate::domain::user::{validate_email, validate_password, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::crypto::constant_time_eq;

/// Collaborators injected into the user service
#[derive(Clone)]
pub struct UserServiceDeps {
    pub users: Arc<dyn UserRepository>,
    pub salts: Arc<dyn SaltRepository>,
    pub keypairs: Arc<dyn KeypairRepository>,
    pub hasher: Arc<dyn HashService>,
    pub encryption: Arc<dyn EncryptionService>,
    pub string_encryption: Arc<dyn StringEncryptionService>,
    pub tokens: Arc<dyn TokenService>,
}

/// User service for authentication and account lifecycle
#[derive(Clone)]
pub struct UserService {
    deps: UserServiceDeps,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    /// Create a new user service
    pub fn new(deps: UserServiceDeps) -> Self {
        Self { deps }
    }

    /// Authenticate with email and password and issue a signed token
    ///
    /// Unknown emails and wrong passwords fail identically with
    /// `AuthenticationFailed`.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<Token, DomainError> {
        let stored_email = self.deps.string_encryption.encrypt_string(email)?;

        let Some(user) = self.deps.users.get_by_email(&stored_email).await? else {
            warn!("Login rejected: unknown email");
            return Err(DomainError::authentication_failed());
        };

        self.verify_password(&user, password).await?;

        let Some(keypair) = self.ensure_keypair(user.id()).await? else {
            warn!(user_id = %user.id(), "Login rejected: account deleted during login");
            return Err(DomainError::authentication_failed());
        };
        let user = self.reveal(user)?;

        let token = self
            .deps
            .tokens
            .generate_token(&user, keypair.private_key())
            .await?;

        info!(user_id = %user.id(), expires_at = %token.expires_at, "User logged in");
        Ok(token)
    }

    /// Register a new account and return its id
    ///
    /// The user record, its salt and its keypair are all written before
    /// this returns. If a later write fails, earlier ones are removed again.
    #[instrument(skip_all)]
    pub async fn add_user(&self, email: &str, password: &str) -> Result<UserId, DomainError> {
        validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        let stored_email = self.deps.string_encryption.encrypt_string(email)?;

        if self.deps.users.get_by_email(&stored_email).await?.is_some() {
            return Err(DomainError::conflict("Email is already registered"));
        }

        let HashedPassword { hash, salt } = self.deps.hasher.hash_new(password).await?;
        let user_id = UserId::generate();
        let keypair = self
            .deps
            .encryption
            .generate_keypair()
            .await?
            .into_keypair(user_id.clone());

        self.deps
            .users
            .insert(User::new(user_id.clone(), stored_email, hash))
            .await?;

        if let Err(e) = self.store_credentials(&user_id, salt, keypair).await {
            warn!(user_id = %user_id, error = %e, "Registration incomplete, rolling back");
            self.rollback_registration(&user_id).await;
            return Err(e);
        }

        info!(user_id = %user_id, "User registered");
        Ok(user_id)
    }

    /// Delete an account after confirming its password
    ///
    /// Removes the user record, then the salt, then the keypair. If a
    /// later delete fails the user record (and salt, if already gone) is
    /// put back so the account stays usable and the call can be retried.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn delete_user(&self, user_id: &str, password: &str) -> Result<(), DomainError> {
        let id = UserId::new(user_id)
            .map_err(|_| DomainError::not_found(format!("User '{}' not found", user_id)))?;

        let user = self
            .deps
            .users
            .get(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", user_id)))?;

        let salt = self.verify_password(&user, password).await?;

        self.deps.users.delete(&id).await?;

        if let Err(e) = self.deps.salts.delete(&id).await {
            warn!(error = %e, "Salt delete failed, restoring user");
            self.restore_account(&user, None).await;
            return Err(e);
        }

        if let Err(e) = self.deps.keypairs.delete(&id).await {
            warn!(error = %e, "Keypair delete failed, restoring user and salt");
            self.restore_account(&user, Some(salt)).await;
            return Err(e);
        }

        info!("User deleted");
        Ok(())
    }

    /// Look up a user by plaintext email
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, DomainError> {
        let stored_email = self.deps.string_encryption.encrypt_string(email)?;

        match self.deps.users.get_by_email(&stored_email).await? {
            Some(user) => Ok(Some(self.reveal(user)?)),
            None => Ok(None),
        }
    }

    /// Look up a user by id
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        let id = UserId::new(user_id).map_err(|e| DomainError::validation(e.to_string()))?;

        match self.deps.users.get(&id).await? {
            Some(user) => Ok(Some(self.reveal(user)?)),
            None => Ok(None),
        }
    }

    /// The user's public key XML, issuing a keypair first if none exists
    pub async fn public_key(&self, user_id: &str) -> Result<String, DomainError> {
        let id = UserId::new(user_id)
            .map_err(|_| DomainError::not_found(format!("User '{}' not found", user_id)))?;

        if self.deps.users.get(&id).await?.is_none() {
            return Err(DomainError::not_found(format!("User '{}' not found", user_id)));
        }

        let keypair = self
            .ensure_keypair(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", user_id)))?;
        Ok(keypair.public_key().to_string())
    }

    /// Verify a token issued by `login` against its owner's public key
    #[instrument(skip_all)]
    pub async fn validate_token(&self, token: &str) -> Result<TokenClaims, DomainError> {
        let key_id = self.deps.tokens.key_id(token).map_err(|e| {
            debug!(error = %e, "Token rejected: unreadable header");
            DomainError::authentication_failed()
        })?;

        let id = UserId::new(key_id).map_err(|_| DomainError::authentication_failed())?;

        let Some(keypair) = self.deps.keypairs.get(&id).await? else {
            debug!(user_id = %id, "Token rejected: no keypair for signer");
            return Err(DomainError::authentication_failed());
        };

        let claims = self
            .deps
            .tokens
            .validate_token(token, keypair.public_key())
            .await
            .map_err(|e| {
                if e.is_collaborator_failure() {
                    return e;
                }
                debug!(user_id = %id, error = %e, "Token rejected");
                DomainError::authentication_failed()
            })?;

        if claims.user_id() != id.as_str() {
            warn!(user_id = %id, "Token subject does not match its signing key");
            return Err(DomainError::authentication_failed());
        }

        Ok(claims)
    }

    /// Check a password against the user's stored hash; returns the salt used
    async fn verify_password(&self, user: &User, password: &str) -> Result<Salt, DomainError> {
        let Some(salt) = self.deps.salts.get(user.id()).await? else {
            warn!(user_id = %user.id(), "Authentication rejected: no salt stored");
            return Err(DomainError::authentication_failed());
        };

        let hash = self.deps.hasher.hash(password, &salt).await?;

        if !constant_time_eq(&hash, user.password_hash()) {
            warn!(user_id = %user.id(), "Authentication rejected: password mismatch");
            return Err(DomainError::authentication_failed());
        }

        Ok(salt)
    }

    /// Get the user's keypair, generating and storing one if absent
    ///
    /// Returns `None` when the user was deleted while a keypair was being
    /// issued; the freshly stored keypair is removed again in that case.
    async fn ensure_keypair(&self, id: &UserId) -> Result<Option<Keypair>, DomainError> {
        if let Some(keypair) = self.deps.keypairs.get(id).await? {
            return Ok(Some(keypair));
        }

        debug!(user_id = %id, "No keypair stored, issuing one");
        let keypair = self
            .deps
            .encryption
            .generate_keypair()
            .await?
            .into_keypair(id.clone());

        match self.deps.keypairs.insert(keypair.clone()).await {
            Ok(()) => {}
            // Another request issued one first; use theirs
            Err(DomainError::Conflict { .. }) => {
                return self
                    .deps
                    .keypairs
                    .get(id)
                    .await?
                    .map(Some)
                    .ok_or_else(|| DomainError::internal("Keypair vanished during issuance"));
            }
            Err(e) => return Err(e),
        }

        // A concurrent delete may have finished before the insert landed
        if self.deps.users.get(id).await?.is_none() {
            warn!(user_id = %id, "User deleted during keypair issuance, discarding keypair");
            if let Err(e) = self.deps.keypairs.delete(id).await {
                error!(user_id = %id, error = %e, "Failed to discard orphaned keypair");
                return Err(e);
            }
            return Ok(None);
        }

        Ok(Some(keypair))
    }

    async fn store_credentials(
        &self,
        id: &UserId,
        salt: Salt,
        keypair: Keypair,
    ) -> Result<(), DomainError> {
        self.deps.salts.insert(id, salt).await?;
        self.deps.keypairs.insert(keypair).await
    }

    async fn rollback_registration(&self, id: &UserId) {
        if let Err(e) = self.deps.keypairs.delete(id).await {
            error!(user_id = %id, error = %e, "Rollback failed to remove keypair");
        }
        if let Err(e) = self.deps.salts.delete(id).await {
            error!(user_id = %id, error = %e, "Rollback failed to remove salt");
        }
        if let Err(e) = self.deps.users.delete(id).await {
            error!(user_id = %id, error = %e, "Rollback failed to remove user");
        }
    }

    async fn restore_account(&self, user: &User, salt: Option<Salt>) {
        if let Err(e) = self.deps.users.insert(user.clone()).await {
            error!(user_id = %user.id(), error = %e, "Failed to restore user record");
        }

        if let Some(salt) = salt {
            if let Err(e) = self.deps.salts.insert(user.id(), salt).await {
                error!(user_id = %user.id(), error = %e, "Failed to restore salt");
            }
        }
    }

    /// Replace the stored email with its plaintext
    fn reveal(&self, user: User) -> Result<User, DomainError> {
        let email = self.deps.string_encryption.decrypt_string(user.email())?;
        Ok(user.with_email(email))
    }
}
