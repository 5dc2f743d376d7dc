//! Cyber Auth
//!
//! Account and credential backend with support for:
//! - Registration, login and deletion by email and password
//! - Argon2id password hashing with per-user salts
//! - Per-user RSA keypairs exchanged as `RSAKeyValue` XML
//! - RS256 tokens signed with the user's own key

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_support;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use domain::DomainError;
use infrastructure::{
    auth::{RsaJwtTokenService, TokenConfig},
    crypto::{Argon2HashService, ChaChaStringEncryptionService, RsaEncryptionService},
    keypair::InMemoryKeypairRepository,
    salt::InMemorySaltRepository,
    user::{InMemoryUserRepository, UserService, UserServiceDeps},
};

/// Build a user service over in-memory stores from configuration
pub fn build_user_service(config: &AppConfig) -> Result<UserService, DomainError> {
    let string_encryption = match config.encryption.key.as_deref() {
        Some(key) => ChaChaStringEncryptionService::from_base64(key)?,
        None => {
            warn!("No encryption key configured, using a random key for this process");
            ChaChaStringEncryptionService::generate()
        }
    };

    let encryption = RsaEncryptionService::with_key_bits(config.auth.rsa_key_bits)?;
    let token_config = TokenConfig::new(
        config.auth.token_expiration_hours,
        config.auth.issuer.clone(),
    );
    token_config.validate()?;
    let tokens = RsaJwtTokenService::new(token_config);

    let deps = UserServiceDeps {
        users: Arc::new(InMemoryUserRepository::new()),
        salts: Arc::new(InMemorySaltRepository::new()),
        keypairs: Arc::new(InMemoryKeypairRepository::new()),
        hasher: Arc::new(Argon2HashService::new()?),
        encryption: Arc::new(encryption),
        string_encryption: Arc::new(string_encryption),
        tokens: Arc::new(tokens),
    };

    info!(
        key_bits = config.auth.rsa_key_bits,
        token_expiration_hours = config.auth.token_expiration_hours,
        "User service initialized"
    );

    Ok(UserService::new(deps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_defaults() {
        let config = AppConfig::default();
        assert!(build_user_service(&config).is_ok());
    }

    #[test]
    fn test_build_rejects_bad_encryption_key() {
        let mut config = AppConfig::default();
        config.encryption.key = Some("not base64!".to_string());

        let err = build_user_service(&config).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_build_rejects_token_lifetime_out_of_range() {
        for hours in [0, 1_000_000_000_000, u64::MAX] {
            let mut config = AppConfig::default();
            config.auth.token_expiration_hours = hours;

            let err = build_user_service(&config).unwrap_err();
            assert!(matches!(err, DomainError::Configuration { .. }));
        }
    }

    #[test]
    fn test_build_rejects_small_keys() {
        let mut config = AppConfig::default();
        config.auth.rsa_key_bits = 1024;

        let err = build_user_service(&config).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
