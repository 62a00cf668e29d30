//! Error Types

use thiserror::Error;

/// Result type alias for tenant and catalog operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Tenant and catalog errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// Referenced store has no backing record
    #[error("Store not found: {0}")]
    StoreNotFound(crate::store::StoreId),

    /// Registration attempted with an email that is already taken
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Product missing, or owned by a different store
    #[error("Product not found: {0}")]
    ProductNotFound(crate::catalog::ProductId),

    /// Malformed input rejected before reaching business logic
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            CoreError::StoreNotFound(_) => "Store not found.",
            CoreError::EmailTaken(_) => "That email is already registered.",
            CoreError::ProductNotFound(_) => "Product not found.",
            CoreError::Validation(_) => "Invalid request.",
            CoreError::Storage(_) => "An error occurred processing your request.",
        }
    }
}
