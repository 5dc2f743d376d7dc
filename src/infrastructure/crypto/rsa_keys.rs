//! RSA keypair issuance in the key-exchange XML encoding

use async_trait::async_trait;
use rand::rngs::OsRng;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use tracing::debug;

use crate::domain::crypto::EncryptionService;
use crate::domain::keypair::{GeneratedKeypair, RsaParameters};
use crate::domain::DomainError;

/// Default modulus size in bits
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest modulus accepted for token signing keys
pub const MIN_KEY_BITS: usize = 2048;

/// Largest modulus accepted
pub const MAX_KEY_BITS: usize = 8192;

/// RSA encryption service producing key-exchange XML keypairs
#[derive(Debug, Clone)]
pub struct RsaEncryptionService {
    key_bits: usize,
}

impl RsaEncryptionService {
    /// Create a service generating keys of the default size
    pub fn new() -> Self {
        Self {
            key_bits: DEFAULT_KEY_BITS,
        }
    }

    /// Create a service generating keys of the given size
    pub fn with_key_bits(key_bits: usize) -> Result<Self, DomainError> {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&key_bits) || key_bits % 8 != 0 {
            return Err(DomainError::configuration(format!(
                "RSA key size must be a multiple of 8 between {} and {} bits, got {}",
                MIN_KEY_BITS, MAX_KEY_BITS, key_bits
            )));
        }

        Ok(Self { key_bits })
    }

    pub fn key_bits(&self) -> usize {
        self.key_bits
    }

    /// Generate a keypair on the current thread
    ///
    /// The RNG is acquired per call; nothing is shared between calls.
    pub fn generate_keypair_blocking(key_bits: usize) -> Result<GeneratedKeypair, DomainError> {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, key_bits)
            .map_err(|e| DomainError::crypto(format!("Failed to generate RSA key: {}", e)))?;

        let parameters = parameters_from_private_key(&private_key)?;

        Ok(GeneratedKeypair {
            public_key_xml: parameters.to_xml(false),
            private_key_xml: parameters.to_xml(true),
        })
    }
}

impl Default for RsaEncryptionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EncryptionService for RsaEncryptionService {
    async fn generate_keypair(&self) -> Result<GeneratedKeypair, DomainError> {
        let key_bits = self.key_bits;
        debug!(key_bits, "Generating RSA keypair");

        tokio::task::spawn_blocking(move || Self::generate_keypair_blocking(key_bits))
            .await
            .map_err(|e| DomainError::internal(format!("Key generation task failed: {}", e)))?
    }

    fn parse_key_xml(&self, xml: &str) -> Result<RsaParameters, DomainError> {
        RsaParameters::from_xml(xml)
    }
}

/// Export every parameter of a private key
///
/// Numbers are written at the fixed widths other key-exchange XML readers
/// expect: `D` as wide as the modulus, the CRT values half as wide.
pub fn parameters_from_private_key(key: &RsaPrivateKey) -> Result<RsaParameters, DomainError> {
    let modulus = key.n().to_bytes_be();
    let modulus_len = modulus.len();
    let half_len = modulus_len.div_ceil(2);

    let primes = key.primes();
    if primes.len() != 2 {
        return Err(DomainError::crypto(format!(
            "Expected a two-prime RSA key, found {} primes",
            primes.len()
        )));
    }

    let dp = key
        .dp()
        .ok_or_else(|| DomainError::crypto("RSA key is missing CRT exponent DP"))?;
    let dq = key
        .dq()
        .ok_or_else(|| DomainError::crypto("RSA key is missing CRT exponent DQ"))?;
    let inverse_q = key
        .crt_coefficient()
        .ok_or_else(|| DomainError::crypto("RSA key is missing CRT coefficient"))?;

    Ok(RsaParameters {
        modulus: Some(modulus),
        exponent: Some(key.e().to_bytes_be()),
        p: Some(to_padded_bytes(&primes[0], half_len)),
        q: Some(to_padded_bytes(&primes[1], half_len)),
        dp: Some(to_padded_bytes(dp, half_len)),
        dq: Some(to_padded_bytes(dq, half_len)),
        inverse_q: Some(to_padded_bytes(&inverse_q, half_len)),
        d: Some(to_padded_bytes(key.d(), modulus_len)),
    })
}

/// Export the public parameters of a key
pub fn parameters_from_public_key(key: &RsaPublicKey) -> RsaParameters {
    RsaParameters {
        modulus: Some(key.n().to_bytes_be()),
        exponent: Some(key.e().to_bytes_be()),
        ..RsaParameters::default()
    }
}

/// Rebuild a private key; requires Modulus, Exponent, D, P and Q
pub fn private_key_from_parameters(parameters: &RsaParameters) -> Result<RsaPrivateKey, DomainError> {
    let n = required(&parameters.modulus, "Modulus")?;
    let e = required(&parameters.exponent, "Exponent")?;
    let d = required(&parameters.d, "D")?;
    let p = required(&parameters.p, "P")?;
    let q = required(&parameters.q, "Q")?;

    let mut key = RsaPrivateKey::from_components(n, e, d, vec![p, q])
        .map_err(|e| DomainError::invalid_key_format(format!("Invalid RSA key components: {}", e)))?;

    key.validate()
        .map_err(|e| DomainError::invalid_key_format(format!("Inconsistent RSA private key: {}", e)))?;
    key.precompute()
        .map_err(|e| DomainError::invalid_key_format(format!("Inconsistent RSA private key: {}", e)))?;

    Ok(key)
}

/// Rebuild a public key; requires Modulus and Exponent
pub fn public_key_from_parameters(parameters: &RsaParameters) -> Result<RsaPublicKey, DomainError> {
    let n = required(&parameters.modulus, "Modulus")?;
    let e = required(&parameters.exponent, "Exponent")?;

    RsaPublicKey::new(n, e)
        .map_err(|e| DomainError::invalid_key_format(format!("Invalid RSA public key: {}", e)))
}

/// Parse a private key straight from its XML encoding
pub fn private_key_from_xml(xml: &str) -> Result<RsaPrivateKey, DomainError> {
    private_key_from_parameters(&RsaParameters::from_xml(xml)?)
}

/// Parse a public key straight from its XML encoding
///
/// A full private encoding is accepted too; only its public half is used.
pub fn public_key_from_xml(xml: &str) -> Result<RsaPublicKey, DomainError> {
    public_key_from_parameters(&RsaParameters::from_xml(xml)?)
}

fn required(value: &Option<Vec<u8>>, field: &str) -> Result<BigUint, DomainError> {
    value
        .as_deref()
        .map(BigUint::from_bytes_be)
        .ok_or_else(|| DomainError::invalid_key_format(format!("RSA key is missing '{}'", field)))
}

fn to_padded_bytes(value: &BigUint, len: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes.len() >= len {
        return bytes;
    }

    let mut padded = vec![0u8; len - bytes.len()];
    padded.extend_from_slice(&bytes);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::shared_keypair;

    #[test]
    fn test_key_bits_bounds() {
        assert!(RsaEncryptionService::with_key_bits(2048).is_ok());
        assert!(RsaEncryptionService::with_key_bits(4096).is_ok());
        assert!(RsaEncryptionService::with_key_bits(1024).is_err());
        assert!(RsaEncryptionService::with_key_bits(2049).is_err());
        assert!(RsaEncryptionService::with_key_bits(16384).is_err());
        assert_eq!(RsaEncryptionService::default().key_bits(), 2048);
    }

    #[test]
    fn test_private_export_has_all_fields() {
        let keypair = shared_keypair();
        let parameters = RsaEncryptionService::new()
            .parse_key_xml(&keypair.private_key_xml)
            .unwrap();

        for (name, value) in [
            ("Modulus", &parameters.modulus),
            ("Exponent", &parameters.exponent),
            ("P", &parameters.p),
            ("Q", &parameters.q),
            ("DP", &parameters.dp),
            ("DQ", &parameters.dq),
            ("InverseQ", &parameters.inverse_q),
            ("D", &parameters.d),
        ] {
            let bytes = value.as_ref().unwrap_or_else(|| panic!("{} missing", name));
            assert!(!bytes.is_empty(), "{} empty", name);
        }

        assert_eq!(parameters.modulus.as_ref().map(Vec::len), Some(256));
        assert_eq!(parameters.d.as_ref().map(Vec::len), Some(256));
        assert_eq!(parameters.p.as_ref().map(Vec::len), Some(128));
        assert_eq!(parameters.exponent, Some(vec![1, 0, 1]));
    }

    #[test]
    fn test_public_export_has_only_modulus_and_exponent() {
        let keypair = shared_keypair();
        let parameters = RsaEncryptionService::new()
            .parse_key_xml(&keypair.public_key_xml)
            .unwrap();

        assert!(parameters.modulus.as_ref().is_some_and(|m| !m.is_empty()));
        assert!(parameters.exponent.as_ref().is_some_and(|e| !e.is_empty()));
        assert!(parameters.p.is_none());
        assert!(parameters.q.is_none());
        assert!(parameters.dp.is_none());
        assert!(parameters.dq.is_none());
        assert!(parameters.inverse_q.is_none());
        assert!(parameters.d.is_none());
    }

    #[test]
    fn test_xml_shape() {
        let keypair = shared_keypair();

        assert!(keypair.public_key_xml.starts_with("<RSAKeyValue><Modulus>"));
        assert!(keypair.public_key_xml.ends_with("</Exponent></RSAKeyValue>"));
        assert!(keypair.private_key_xml.ends_with("</D></RSAKeyValue>"));
    }

    #[test]
    fn test_private_key_round_trips_through_xml() {
        let keypair = shared_keypair();

        let private_key = private_key_from_xml(&keypair.private_key_xml).unwrap();
        let public_key = public_key_from_xml(&keypair.public_key_xml).unwrap();

        assert_eq!(private_key.to_public_key(), public_key);

        let exported = parameters_from_private_key(&private_key).unwrap();
        assert_eq!(exported.to_xml(true), keypair.private_key_xml);
        assert_eq!(
            parameters_from_public_key(&public_key).to_xml(false),
            keypair.public_key_xml
        );
    }

    #[test]
    fn test_public_key_cannot_build_private_key() {
        let keypair = shared_keypair();
        let result = private_key_from_xml(&keypair.public_key_xml);

        assert!(matches!(result, Err(DomainError::InvalidKeyFormat { .. })));
    }

    #[test]
    fn test_private_xml_yields_public_key() {
        let keypair = shared_keypair();

        let from_private = public_key_from_xml(&keypair.private_key_xml).unwrap();
        let from_public = public_key_from_xml(&keypair.public_key_xml).unwrap();

        assert_eq!(from_private, from_public);
    }

    #[test]
    fn test_padding() {
        let value = BigUint::from_bytes_be(&[1, 2]);
        assert_eq!(to_padded_bytes(&value, 4), vec![0, 0, 1, 2]);
        assert_eq!(to_padded_bytes(&value, 1), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_generate_keypair_async() {
        let service = RsaEncryptionService::new();
        let keypair = service.generate_keypair().await.unwrap();

        let parameters = service.parse_key_xml(&keypair.private_key_xml).unwrap();
        assert!(parameters.is_private());
        assert_ne!(keypair.private_key_xml, shared_keypair().private_key_xml);
    }
}
