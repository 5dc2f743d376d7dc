//! Domain layer - Core entities and collaborator traits

pub mod crypto;
pub mod error;
pub mod keypair;
pub mod salt;
pub mod token;
pub mod user;

pub use crypto::{EncryptionService, HashService, HashedPassword, StringEncryptionService};
pub use error::DomainError;
pub use keypair::{GeneratedKeypair, Keypair, KeypairRepository, RsaParameters};
pub use salt::{Salt, SaltRepository};
pub use token::{Token, TokenClaims, TokenResponse, TokenService};
pub use user::{User, UserId, UserRepository};
