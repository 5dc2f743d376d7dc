//! User infrastructure module
//!
//! This module provides the in-memory user repository and the user service
//! that orchestrates registration, login and deletion.

mod repository;
mod service;

pub use repository::InMemoryUserRepository;
pub use service::{UserService, UserServiceDeps};
