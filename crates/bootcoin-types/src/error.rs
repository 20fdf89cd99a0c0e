//! Error types for the bootcoin exchange
//!
//! Validation and not-found failures are detected synchronously and carry no
//! side effects. Infrastructure failures propagate unchanged; the core never
//! retries silently.

use crate::rail::PaymentRail;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for bootcoin operations
pub type Result<T> = std::result::Result<T, BootCoinError>;

/// Bootcoin error taxonomy
#[derive(Debug, Clone, Error)]
pub enum BootCoinError {
    // ========================================================================
    // Not found
    // ========================================================================

    /// User not found in the directory
    #[error("User {document} not found")]
    UserNotFound { document: String },

    /// Purchase not found
    #[error("Purchase {purchase_id} not found")]
    PurchaseNotFound { purchase_id: String },

    /// Bank transaction not found
    #[error("Bank transaction {transaction_id} not found")]
    TransactionNotFound { transaction_id: String },

    // ========================================================================
    // Validation
    // ========================================================================

    /// The chosen rail is not enabled on the user's profile
    #[error("User {document} does not have the {rail} rail enabled")]
    RailNotEnabled { document: String, rail: PaymentRail },

    /// Supplied rail identifier does not match the registered one
    #[error("Supplied {rail} identifier does not match the registered one")]
    RailAddressMismatch { rail: PaymentRail },

    /// Supplied bank account does not match the registered account
    #[error("Bank account provided for {document} does not match the registered account")]
    AccountMismatch { document: String },

    /// Seller balance below the requested amount
    #[error("Insufficient balance for {document}: have {available}, need {required}")]
    InsufficientBalance {
        document: String,
        available: Decimal,
        required: Decimal,
    },

    /// Purchase already matched by a concurrent acceptor, or never advertised
    #[error("Purchase {purchase_id} not found or already taken")]
    PurchaseAlreadyTaken { purchase_id: String },

    /// Amount failed validation
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Wallet rail already associated with the user
    #[error("User {document} already has a wallet associated")]
    WalletAlreadyAssociated { document: String },

    /// Bank account already associated with the user
    #[error("User {document} already has a bank account associated")]
    AccountAlreadyAssociated { document: String },

    /// External validation responded with a rejection
    #[error("Validation rejected: {reason}")]
    ValidationRejected { reason: String },

    // ========================================================================
    // Exchange rate
    // ========================================================================

    /// No exchange rate cached
    #[error("Exchange rate not available")]
    RateUnavailable,

    /// A rate is already cached; use update instead
    #[error("Exchange rate already cached, use update instead")]
    RateAlreadyCached,

    // ========================================================================
    // Correlation bridge
    // ========================================================================

    /// No response arrived inside the bridge deadline
    #[error("Correlation {correlation_id} timed out awaiting a response")]
    CorrelationTimeout { correlation_id: String },

    /// A request with this correlation id is already pending
    #[error("Correlation {correlation_id} is already pending")]
    DuplicateCorrelation { correlation_id: String },

    // ========================================================================
    // Infrastructure
    // ========================================================================

    /// Document store unavailable or inconsistent
    #[error("Store error: {message}")]
    Store { message: String },

    /// Messaging transport unavailable
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl BootCoinError {
    /// Create a store infrastructure error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a transport infrastructure error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an invalid-amount error
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    /// Check if this is a retriable error
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Store { .. } | Self::Transport { .. } | Self::CorrelationTimeout { .. }
        )
    }

    /// Get a stable machine-readable kind for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound { .. } => "USER_NOT_FOUND",
            Self::PurchaseNotFound { .. } => "PURCHASE_NOT_FOUND",
            Self::TransactionNotFound { .. } => "TRANSACTION_NOT_FOUND",
            Self::RailNotEnabled { .. } => "RAIL_NOT_ENABLED",
            Self::RailAddressMismatch { .. } => "RAIL_ADDRESS_MISMATCH",
            Self::AccountMismatch { .. } => "ACCOUNT_MISMATCH",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::PurchaseAlreadyTaken { .. } => "PURCHASE_ALREADY_TAKEN",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::WalletAlreadyAssociated { .. } => "WALLET_ALREADY_ASSOCIATED",
            Self::AccountAlreadyAssociated { .. } => "ACCOUNT_ALREADY_ASSOCIATED",
            Self::ValidationRejected { .. } => "VALIDATION_REJECTED",
            Self::RateUnavailable => "RATE_UNAVAILABLE",
            Self::RateAlreadyCached => "RATE_ALREADY_CACHED",
            Self::CorrelationTimeout { .. } => "CORRELATION_TIMEOUT",
            Self::DuplicateCorrelation { .. } => "DUPLICATE_CORRELATION",
            Self::Store { .. } => "STORE_ERROR",
            Self::Transport { .. } => "TRANSPORT_ERROR",
        }
    }
}
