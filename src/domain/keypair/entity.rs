//! Keypair entity

use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// A user's RSA keypair, both halves in key-exchange XML
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypair {
    user_id: UserId,
    public_key: String,
    /// Never exposed in serialization
    #[serde(skip_serializing, default)]
    private_key: String,
}

impl Keypair {
    pub fn new(
        user_id: UserId,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("user_id", &self.user_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"[hidden]")
            .finish()
    }
}

/// Freshly generated keypair, not yet bound to a user
#[derive(Clone)]
pub struct GeneratedKeypair {
    pub public_key_xml: String,
    pub private_key_xml: String,
}

impl GeneratedKeypair {
    /// Bind the generated keys to a user
    pub fn into_keypair(self, user_id: UserId) -> Keypair {
        Keypair::new(user_id, self.public_key_xml, self.private_key_xml)
    }
}

impl std::fmt::Debug for GeneratedKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedKeypair")
            .field("public_key_xml", &self.public_key_xml)
            .field("private_key_xml", &"[hidden]")
            .finish()
    }
}
