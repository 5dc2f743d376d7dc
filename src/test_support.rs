//! Shared fixtures for unit tests

use std::sync::{Arc, OnceLock};

use crate::domain::crypto::{HashService, MockEncryptionService};
use crate::domain::keypair::{GeneratedKeypair, RsaParameters};
use crate::infrastructure::auth::{RsaJwtTokenService, TokenConfig};
use crate::infrastructure::crypto::{
    Argon2HashService, ChaChaStringEncryptionService, RsaEncryptionService,
};
use crate::infrastructure::keypair::InMemoryKeypairRepository;
use crate::infrastructure::salt::InMemorySaltRepository;
use crate::infrastructure::user::{InMemoryUserRepository, UserService, UserServiceDeps};

/// A 2048-bit keypair generated once per test binary
///
/// Key generation is slow in debug builds, so tests that only need some
/// valid key share this one.
pub fn shared_keypair() -> GeneratedKeypair {
    static KEYPAIR: OnceLock<GeneratedKeypair> = OnceLock::new();

    KEYPAIR
        .get_or_init(|| {
            RsaEncryptionService::generate_keypair_blocking(2048)
                .expect("test keypair generation failed")
        })
        .clone()
}

/// Encryption service handing out the shared keypair
pub fn shared_key_encryption_service() -> MockEncryptionService {
    let mut service = MockEncryptionService::new();
    service
        .expect_generate_keypair()
        .returning(|| Ok(shared_keypair()));
    service
        .expect_parse_key_xml()
        .returning(RsaParameters::from_xml);
    service
}

/// In-memory stores behind a user service, kept reachable for assertions
pub struct Harness {
    pub users: Arc<InMemoryUserRepository>,
    pub salts: Arc<InMemorySaltRepository>,
    pub keypairs: Arc<InMemoryKeypairRepository>,
    pub service: UserService,
}

/// A user service over in-memory stores and real crypto
pub fn harness() -> Harness {
    harness_with_hasher(Arc::new(
        Argon2HashService::with_params(1024, 1, 1).expect("test hasher params"),
    ))
}

/// Same as `harness`, with the password hasher supplied by the caller
pub fn harness_with_hasher(hasher: Arc<dyn HashService>) -> Harness {
    let users = Arc::new(InMemoryUserRepository::new());
    let salts = Arc::new(InMemorySaltRepository::new());
    let keypairs = Arc::new(InMemoryKeypairRepository::new());

    let deps = UserServiceDeps {
        users: users.clone(),
        salts: salts.clone(),
        keypairs: keypairs.clone(),
        hasher,
        encryption: Arc::new(shared_key_encryption_service()),
        string_encryption: Arc::new(ChaChaStringEncryptionService::new([42u8; 32])),
        tokens: Arc::new(RsaJwtTokenService::new(TokenConfig::default())),
    };

    Harness {
        users,
        salts,
        keypairs,
        service: UserService::new(deps),
    }
}
