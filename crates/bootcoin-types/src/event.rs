//! Messaging event payloads
//!
//! The wire format of the broker is out of scope; these are the abstract
//! payloads the core publishes and consumes, serialized through serde.

use crate::identity::{BankTransactionId, CorrelationId, PurchaseId};
use crate::purchase::Purchase;
use crate::rail::PaymentRail;
use crate::transaction::BankTransaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outgoing association-validation request, resolved by correlation id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub correlation_id: CorrelationId,
    pub document_number: String,
    pub phone_number: Option<String>,
    pub bank_account_id: Option<String>,
}

impl ValidationRequest {
    /// Validation of a wallet association for the given phone
    pub fn wallet(document_number: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            document_number: document_number.into(),
            phone_number: Some(phone_number.into()),
            bank_account_id: None,
        }
    }

    /// Validation of a bank-account association
    pub fn bank_account(
        document_number: impl Into<String>,
        bank_account_id: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            document_number: document_number.into(),
            phone_number: None,
            bank_account_id: Some(bank_account_id.into()),
        }
    }
}

/// Inbound answer to a [`ValidationRequest`], matched by correlation id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub correlation_id: CorrelationId,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Settlement request published when a seller claims a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseSettlementRequested {
    pub purchase_id: PurchaseId,
    pub rail: PaymentRail,
    pub buyer_document: String,
    pub seller_document: String,
    pub amount: Decimal,
    pub total_amount: Decimal,
    pub buyer_phone: Option<String>,
    pub seller_phone: Option<String>,
    pub buyer_account: Option<String>,
    pub seller_account: Option<String>,
}

impl PurchaseSettlementRequested {
    /// Build the event for a purchase that has just been claimed
    ///
    /// Only the identifiers of the purchase's rail are carried, matching the
    /// rail-specific topic the event goes out on.
    pub fn from_purchase(purchase: &Purchase, seller_document: String) -> Self {
        let (buyer_phone, seller_phone, buyer_account, seller_account) = match purchase.rail {
            PaymentRail::Wallet => (
                Some(purchase.buyer_phone.clone()),
                purchase.seller_phone.clone(),
                None,
                None,
            ),
            PaymentRail::BankTransfer => (
                None,
                None,
                purchase.buyer_account.clone(),
                purchase.seller_account.clone(),
            ),
        };
        Self {
            purchase_id: purchase.id.clone(),
            rail: purchase.rail,
            buyer_document: purchase.buyer_document.clone(),
            seller_document,
            amount: purchase.amount,
            total_amount: purchase.total_amount,
            buyer_phone,
            seller_phone,
            buyer_account,
            seller_account,
        }
    }
}

/// Inbound settlement confirmation for a P2P purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSettlementResult {
    pub purchase_id: PurchaseId,
    pub success: bool,
    pub message: Option<String>,
}

/// Settlement request published when a bank-direct transaction opens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankPurchaseRequested {
    pub transaction_id: BankTransactionId,
    pub buyer_document: String,
    pub amount: Decimal,
    pub total_amount: Decimal,
    pub buyer_account: String,
}

impl BankPurchaseRequested {
    pub fn from_transaction(tx: &BankTransaction) -> Self {
        Self {
            transaction_id: tx.id.clone(),
            buyer_document: tx.buyer_document.clone(),
            amount: tx.amount,
            total_amount: tx.total_amount,
            buyer_account: tx.buyer_account.clone(),
        }
    }
}

/// Inbound settlement confirmation for a bank-direct transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankPurchaseCompleted {
    pub transaction_id: BankTransactionId,
    pub accepted: bool,
    pub message: Option<String>,
}
