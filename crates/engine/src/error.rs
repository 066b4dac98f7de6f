//! The module contains the error the engine can throw.
//!
//! Every operation aborts its unit of work on the first error, so a caller
//! receiving any of these variants can rely on nothing having been written.
//!
//! - [`NotFound`] thrown when an entity is absent or owned by another user.
//! - [`Unauthorized`] thrown when ownership is checked through a parent
//!   entity (a debt payment through its debt) and does not match.
//! - [`StorageFailure`] wraps the underlying database error.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`StorageFailure`]: EngineError::StorageFailure
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Already paid: {0}")]
    AlreadyPaid(String),
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    StorageFailure(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::AlreadyPaid(a), Self::AlreadyPaid(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::StorageFailure(a), Self::StorageFailure(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
