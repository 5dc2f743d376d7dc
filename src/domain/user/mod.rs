//! User domain
//!
//! This module provides the user entity, input validation and the
//! repository trait the authentication core stores accounts through.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId};
pub use repository::UserRepository;
pub use validation::{validate_email, validate_password, validate_user_id, UserValidationError};

#[cfg(test)]
pub use repository::MockUserRepository;
