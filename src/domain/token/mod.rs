//! Issued tokens and the token signing trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::User;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// A signed credential returned after successful authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// User-facing token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        Self {
            token: token.value,
            expires_at: Some(token.expires_at),
        }
    }
}

/// Claims carried by an issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    /// Get user ID from claims
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Check if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Token signing with a user's private key
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Sign a token for a user with their private key XML
    async fn generate_token(&self, user: &User, private_key_xml: &str)
        -> Result<Token, DomainError>;

    /// Verify a token's signature and expiry against a public key XML
    async fn validate_token(
        &self,
        token: &str,
        public_key_xml: &str,
    ) -> Result<TokenClaims, DomainError>;

    /// Read the signing key id from a token header without verifying it
    fn key_id(&self, token: &str) -> Result<String, DomainError>;
}
