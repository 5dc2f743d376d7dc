//! Infrastructure layer - Collaborator implementations and the user service

pub mod auth;
pub mod crypto;
pub mod keypair;
pub mod logging;
pub mod salt;
pub mod user;
