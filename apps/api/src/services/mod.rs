// Application services
// Multi-aggregate workflows shared by the HTTP handlers

pub mod catalog_sync;
pub mod checkout;
pub mod invitations;
pub mod teams;

use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::payments::PaymentError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    /// The checkout session exists but has not been paid
    #[error("{0}")]
    PaymentRequired(String),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
