//! Bank-direct transaction records
//!
//! Single-party analogue of the P2P purchase: the customer sells bootcoin to
//! the bank, which confirms settlement with an external event keyed by
//! transaction id.

use crate::identity::BankTransactionId;
use crate::status::TransactionStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bank-direct bootcoin transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: BankTransactionId,
    pub buyer_document: String,
    /// Requested amount in bootcoin
    pub amount: Decimal,
    /// Computed total in local currency (`amount × buy_rate`)
    pub total_amount: Decimal,
    pub buyer_account: String,
    pub status: TransactionStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BankTransaction {
    /// Open a new transaction in `Pending`
    pub fn request(
        buyer_document: impl Into<String>,
        buyer_account: impl Into<String>,
        amount: Decimal,
        total_amount: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BankTransactionId::new(),
            buyer_document: buyer_document.into(),
            amount,
            total_amount,
            buyer_account: buyer_account.into(),
            status: TransactionStatus::Pending,
            message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a terminal settlement outcome
    pub fn finalize(&mut self, status: TransactionStatus, message: Option<String>) {
        self.status = status;
        self.message = message;
        self.updated_at = Utc::now();
    }
}
