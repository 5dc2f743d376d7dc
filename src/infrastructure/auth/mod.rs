//! Authentication infrastructure module
//!
//! This module provides JWT issuance signed with per-user RSA keys.

mod jwt;

pub use jwt::{RsaJwtTokenService, TokenConfig, MAX_EXPIRATION_HOURS};
