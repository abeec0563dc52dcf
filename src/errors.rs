//! Unified error type for the marketplace backend.
//!
//! Every fallible operation returns [`Result`]. Each variant belongs to one
//! [`ErrorKind`], which is what callers branch on when turning an error into a
//! response.

use thiserror::Error;

/// Coarse classification of an [`Error`] for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced product, address, user or transaction does not exist
    NotFound,
    /// The resource exists but is owned by someone else
    Forbidden,
    /// Malformed request or unusable stored data
    InvalidInput,
    /// Requested quantity exceeds available stock
    InsufficientStock,
    /// The atomic order commit failed and was rolled back
    ConflictOnCommit,
    /// Storage, configuration or I/O failure
    Internal,
}

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying SeaORM/database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A request field failed validation
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Which field or condition was violated
        message: String,
    },

    /// A stored consumer price is not a usable integer amount
    #[error("Product {product_id} has an unusable price: {value:?}")]
    InvalidPrice {
        /// Product carrying the bad price
        product_id: i64,
        /// The raw stored value
        value: String,
    },

    /// User does not exist
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: i64,
    },

    /// Product does not exist
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// Address does not exist
    #[error("Address not found: {id}")]
    AddressNotFound {
        /// Requested address id
        id: i64,
    },

    /// Transaction does not exist or is not visible to the caller
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Requested transaction id
        id: i64,
    },

    /// Resource is owned by another user
    #[error("{resource} {id} does not belong to the caller")]
    Forbidden {
        /// Kind of resource, e.g. `"address"`
        resource: &'static str,
        /// Resource id
        id: i64,
    },

    /// Not enough stock to satisfy the order
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product being ordered
        product_id: i64,
        /// Stock at the time of the check
        available: i32,
        /// Quantity requested
        requested: i32,
    },

    /// Commit-phase failure. The cause is logged, never exposed.
    #[error("Failed to create order")]
    OrderFailed,

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Maps this error to its [`ErrorKind`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound { .. }
            | Self::ProductNotFound { .. }
            | Self::AddressNotFound { .. }
            | Self::TransactionNotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::InvalidInput { .. } | Self::InvalidPrice { .. } => ErrorKind::InvalidInput,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::OrderFailed => ErrorKind::ConflictOnCommit,
            Self::Database(_) | Self::Config { .. } | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for [`Error::InvalidInput`].
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
