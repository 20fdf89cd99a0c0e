//! Immutable settlement history records
//!
//! One record is appended per completed P2P purchase, before balances move.
//! Records are append-only and never updated.

use crate::identity::{PurchaseId, SettlementRecordId};
use crate::rail::PaymentRail;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// History row for a settled P2P purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: SettlementRecordId,
    pub purchase_id: PurchaseId,
    pub rail: PaymentRail,
    pub amount: Decimal,
    pub total_amount: Decimal,
    pub buyer_document: String,
    pub seller_document: String,
    pub buyer_phone: String,
    pub seller_phone: Option<String>,
    pub buyer_account: Option<String>,
    pub seller_account: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
