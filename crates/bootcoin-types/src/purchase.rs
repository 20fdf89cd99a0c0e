//! P2P purchase records
//!
//! A purchase is advertised by a buyer, later claimed by exactly one seller,
//! and finalized by an external settlement confirmation. Seller fields stay
//! unset until the claim; they are written atomically with the
//! `WaitingForSeller → Processing` transition.

use crate::identity::PurchaseId;
use crate::rail::{PaymentRail, RailAddress};
use crate::status::TransactionStatus;
use crate::user::BootCoinUser;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A peer-to-peer bootcoin purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub buyer_document: String,
    /// Filled when a seller accepts the request
    pub seller_document: Option<String>,
    pub rail: PaymentRail,
    /// Requested amount in bootcoin
    pub amount: Decimal,
    /// Computed total in local currency (`amount × sell_rate`)
    pub total_amount: Decimal,
    pub status: TransactionStatus,
    pub buyer_phone: String,
    pub buyer_account: Option<String>,
    /// Filled at match time if the seller settles over the wallet rail
    pub seller_phone: Option<String>,
    /// Filled at match time if the seller settles over the transfer rail
    pub seller_account: Option<String>,
    /// Free-text message recorded from the settlement confirmation
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    /// Advertise a new purchase for the given buyer
    ///
    /// Starts in `WaitingForSeller`; no settlement event is published at
    /// this stage.
    pub fn advertise(
        buyer: &BootCoinUser,
        rail: PaymentRail,
        amount: Decimal,
        total_amount: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PurchaseId::new(),
            buyer_document: buyer.document_number.clone(),
            seller_document: None,
            rail,
            amount,
            total_amount,
            status: TransactionStatus::WaitingForSeller,
            buyer_phone: buyer.phone_number.clone(),
            buyer_account: buyer.bank_account_id.clone(),
            seller_phone: None,
            seller_account: None,
            message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record the winning seller and move to `Processing`
    ///
    /// Callers must hold whatever store-level guard makes the claim atomic;
    /// this only applies the field changes.
    pub fn assign_seller(&mut self, seller_document: String, address: &RailAddress) {
        self.seller_document = Some(seller_document);
        match address {
            RailAddress::Phone(phone) => self.seller_phone = Some(phone.clone()),
            RailAddress::Account(account) => self.seller_account = Some(account.clone()),
        }
        self.status = TransactionStatus::Processing;
        self.updated_at = Utc::now();
    }

    /// Apply a terminal settlement outcome
    pub fn finalize(&mut self, status: TransactionStatus, message: Option<String>) {
        self.status = status;
        self.message = message;
        self.updated_at = Utc::now();
    }
}
