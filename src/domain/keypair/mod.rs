//! Keypair domain
//!
//! Per-user RSA keypairs used to sign issued tokens, and the decoded
//! parameter form of the key-exchange XML they are stored in.

mod entity;
mod parameters;
mod repository;

pub use entity::{GeneratedKeypair, Keypair};
pub use parameters::{RsaParameters, KEY_XML_ROOT};
pub use repository::KeypairRepository;

#[cfg(test)]
pub use repository::MockKeypairRepository;
