//! The module contains the errors the engine can return.
//!
//! Every missing entity has its own variant carrying the id that was looked
//! up, so callers can tell a missing account apart from a missing category
//! when a write references both:
//!
//! - [`UserNotFound`], [`AccountNotFound`], [`CategoryNotFound`],
//!   [`RecordNotFound`] thrown when a lookup by id finds nothing.
//! - [`AccessDenied`] thrown when the principal is neither the owner nor an
//!   admin.
//! - [`Validation`] thrown when a field violates its size or format rule.
//!
//!  [`UserNotFound`]: EngineError::UserNotFound
//!  [`AccountNotFound`]: EngineError::AccountNotFound
//!  [`CategoryNotFound`]: EngineError::CategoryNotFound
//!  [`RecordNotFound`]: EngineError::RecordNotFound
//!  [`AccessDenied`]: EngineError::AccessDenied
//!  [`Validation`]: EngineError::Validation
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("User of id: {0} not found.")]
    UserNotFound(i64),
    #[error("Account of id: {0} not found.")]
    AccountNotFound(i64),
    #[error("Category of id: {0} not found.")]
    CategoryNotFound(i64),
    #[error("Record of id: {0} not found.")]
    RecordNotFound(i64),
    #[error("User with email {0} already exists.")]
    UserAlreadyExists(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UserNotFound(a), Self::UserNotFound(b)) => a == b,
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (Self::CategoryNotFound(a), Self::CategoryNotFound(b)) => a == b,
            (Self::RecordNotFound(a), Self::RecordNotFound(b)) => a == b,
            (Self::UserAlreadyExists(a), Self::UserAlreadyExists(b)) => a == b,
            (Self::AccessDenied(a), Self::AccessDenied(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
