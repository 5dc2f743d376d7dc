//! RS256 JWT issuance signed with each user's own private key

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};

use crate::domain::token::{Token, TokenClaims, TokenService};
use crate::domain::user::User;
use crate::domain::DomainError;
use crate::infrastructure::crypto::{private_key_from_xml, public_key_from_xml};

/// Longest accepted token lifetime (one year)
pub const MAX_EXPIRATION_HOURS: u64 = 24 * 365;

/// Configuration for token issuance
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Token expiration time in hours
    pub expiration_hours: u64,
    /// Value of the `iss` claim, checked on validation
    pub issuer: String,
}

impl TokenConfig {
    /// Create new token configuration
    pub fn new(expiration_hours: u64, issuer: impl Into<String>) -> Self {
        Self {
            expiration_hours,
            issuer: issuer.into(),
        }
    }

    /// Check the lifetime is between one hour and `MAX_EXPIRATION_HOURS`
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(1..=MAX_EXPIRATION_HOURS).contains(&self.expiration_hours) {
            return Err(DomainError::configuration(format!(
                "Token expiration must be between 1 and {} hours, got {}",
                MAX_EXPIRATION_HOURS, self.expiration_hours
            )));
        }

        Ok(())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            expiration_hours: 24,
            issuer: "cyber-auth".to_string(),
        }
    }
}

/// JWT service signing with the RSA private key stored for each user
///
/// The signing user's id goes into the `kid` header so a verifier knows
/// which public key to check against.
#[derive(Debug, Clone)]
pub struct RsaJwtTokenService {
    config: TokenConfig,
}

impl RsaJwtTokenService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn expiration_hours(&self) -> u64 {
        self.config.expiration_hours
    }

    fn claims_for(&self, user: &User) -> Result<TokenClaims, DomainError> {
        let now = Utc::now();
        let exp = i64::try_from(self.config.expiration_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "Token expiration of {} hours is out of range",
                    self.config.expiration_hours
                ))
            })?;

        Ok(TokenClaims {
            sub: user.id().as_str().to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

fn encoding_key_from_xml(private_key_xml: &str) -> Result<EncodingKey, DomainError> {
    let private_key = private_key_from_xml(private_key_xml)?;

    let private_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| DomainError::crypto(format!("Failed to encode RSA private key: {}", e)))?;

    EncodingKey::from_rsa_pem(private_pem.as_bytes())
        .map_err(|e| DomainError::crypto(format!("Failed to create encoding key: {}", e)))
}

fn decoding_key_from_xml(public_key_xml: &str) -> Result<DecodingKey, DomainError> {
    let public_key = public_key_from_xml(public_key_xml)?;

    let public_pem = public_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| DomainError::crypto(format!("Failed to encode RSA public key: {}", e)))?;

    DecodingKey::from_rsa_pem(public_pem.as_bytes())
        .map_err(|e| DomainError::crypto(format!("Failed to create decoding key: {}", e)))
}

#[async_trait]
impl TokenService for RsaJwtTokenService {
    async fn generate_token(
        &self,
        user: &User,
        private_key_xml: &str,
    ) -> Result<Token, DomainError> {
        let encoding_key = encoding_key_from_xml(private_key_xml)?;
        let claims = self.claims_for(user)?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(user.id().as_str().to_string());

        let value = encode(&header, &claims, &encoding_key)
            .map_err(|e| DomainError::crypto(format!("Failed to generate JWT: {}", e)))?;

        let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| DomainError::internal("Token expiry out of range"))?;

        Ok(Token::new(value, expires_at))
    }

    async fn validate_token(
        &self,
        token: &str,
        public_key_xml: &str,
    ) -> Result<TokenClaims, DomainError> {
        let decoding_key = decoding_key_from_xml(public_key_xml)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.set_issuer(&[self.config.issuer.as_str()]);

        let token_data = decode::<TokenClaims>(token, &decoding_key, &validation)
            .map_err(|e| DomainError::validation(format!("Invalid JWT: {}", e)))?;

        Ok(token_data.claims)
    }

    fn key_id(&self, token: &str) -> Result<String, DomainError> {
        let header = decode_header(token)
            .map_err(|e| DomainError::validation(format!("Invalid JWT header: {}", e)))?;

        header
            .kid
            .ok_or_else(|| DomainError::validation("JWT header has no key id"))
    }
}
