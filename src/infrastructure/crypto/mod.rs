//! Cryptographic service implementations
//!
//! Argon2id password hashing, RSA keypair issuance in key-exchange XML and
//! deterministic field encryption.

mod password;
mod rsa_keys;
mod string_cipher;

pub use password::Argon2HashService;
pub use rsa_keys::{
    parameters_from_private_key, parameters_from_public_key, private_key_from_parameters,
    private_key_from_xml, public_key_from_parameters, public_key_from_xml, RsaEncryptionService,
    DEFAULT_KEY_BITS,
};
pub use string_cipher::ChaChaStringEncryptionService;

/// Compare two strings without short-circuiting on the first difference
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
