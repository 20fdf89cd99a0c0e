//! Bootcoin P2P - Peer-to-peer purchase saga
//!
//! A buyer advertises a purchase, one seller claims it, and an external
//! settlement confirmation finishes it:
//!
//! ```text
//! request_purchase        WAITING_FOR_SELLER
//! accept_purchase         WAITING_FOR_SELLER → PROCESSING   (settlement requested)
//! apply_settlement        PROCESSING → COMPLETED | FAILED   (ledger on COMPLETED)
//! ```
//!
//! The claim is a status-guarded store operation, so at most one of any
//! number of concurrent acceptors wins. Settlement is idempotent per
//! purchase id: replayed confirmations never re-run the ledger.

use std::sync::Arc;

use bootcoin_ledger::BalanceLedger;
use bootcoin_messaging::{encode, topics, MessagePublisher};
use bootcoin_rates::RateProvider;
use bootcoin_store::{FinalizeOutcome, PurchaseStore, UserDirectory};
use bootcoin_types::{
    BootCoinError, PaymentRail, Purchase, PurchaseId, PurchaseSettlementRequested,
    PurchaseSettlementResult, RailAddress, Result, TransactionStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A buyer's request to advertise a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub buyer_document: String,
    pub rail: PaymentRail,
    /// Requested amount in bootcoin
    pub amount: Decimal,
}

/// A seller's offer to take an advertised purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellRequest {
    pub seller_document: String,
    /// Phone for the wallet rail, account number for the transfer rail
    pub address: RailAddress,
}

/// Public projection of a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseView {
    pub purchase_id: PurchaseId,
    pub buyer_document: String,
    pub rail: PaymentRail,
    pub amount: Decimal,
    pub total_amount: Decimal,
    pub status: TransactionStatus,
    pub seller_document: Option<String>,
    pub seller_phone: Option<String>,
    pub seller_account: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Purchase> for PurchaseView {
    fn from(purchase: &Purchase) -> Self {
        Self {
            purchase_id: purchase.id.clone(),
            buyer_document: purchase.buyer_document.clone(),
            rail: purchase.rail,
            amount: purchase.amount,
            total_amount: purchase.total_amount,
            status: purchase.status,
            seller_document: purchase.seller_document.clone(),
            seller_phone: purchase.seller_phone.clone(),
            seller_account: purchase.seller_account.clone(),
            created_at: purchase.created_at,
        }
    }
}

/// Orchestrates the P2P purchase lifecycle
pub struct PurchaseService {
    purchases: Arc<dyn PurchaseStore>,
    users: Arc<dyn UserDirectory>,
    rates: Arc<dyn RateProvider>,
    publisher: Arc<dyn MessagePublisher>,
    ledger: BalanceLedger,
}

impl PurchaseService {
    pub fn new(
        purchases: Arc<dyn PurchaseStore>,
        users: Arc<dyn UserDirectory>,
        rates: Arc<dyn RateProvider>,
        publisher: Arc<dyn MessagePublisher>,
        ledger: BalanceLedger,
    ) -> Self {
        Self {
            purchases,
            users,
            rates,
            publisher,
            ledger,
        }
    }

    /// Advertise a purchase for the buyer
    ///
    /// Prices it at the current sell rate and persists it in
    /// `WaitingForSeller`. No settlement event goes out at this stage.
    pub async fn request_purchase(&self, request: PurchaseRequest) -> Result<PurchaseView> {
        ensure_positive(request.amount)?;

        let buyer = self
            .users
            .find_by_document(&request.buyer_document)
            .await?
            .ok_or_else(|| BootCoinError::UserNotFound {
                document: request.buyer_document.clone(),
            })?;
        if !buyer.rail_enabled(request.rail) {
            return Err(BootCoinError::RailNotEnabled {
                document: buyer.document_number,
                rail: request.rail,
            });
        }

        let rate = self.rates.current_rate().await?;
        let total_amount = request.amount * rate.sell_rate;

        let purchase = self
            .purchases
            .save(Purchase::advertise(
                &buyer,
                request.rail,
                request.amount,
                total_amount,
            ))
            .await?;
        info!(
            "purchase {} advertised by {}: {} bootcoin at {} = {}",
            purchase.id, purchase.buyer_document, purchase.amount, rate.sell_rate, total_amount
        );
        Ok(PurchaseView::from(&purchase))
    }

    /// All purchases currently waiting for a seller
    ///
    /// One pass over the store's current state; no live subscription.
    pub async fn pending_purchases(&self) -> Result<Vec<PurchaseView>> {
        Ok(self
            .purchases
            .find_by_status(TransactionStatus::WaitingForSeller)
            .await?
            .iter()
            .map(PurchaseView::from)
            .collect())
    }

    /// Claim an advertised purchase for the seller
    ///
    /// Validations run against the `WaitingForSeller` snapshot; the claim
    /// itself is the store's status-guarded assignment, so a concurrent
    /// acceptor that loses the race observes *purchase-already-taken* even
    /// after passing every check.
    pub async fn accept_purchase(
        &self,
        purchase_id: &PurchaseId,
        request: SellRequest,
    ) -> Result<PurchaseView> {
        let purchase = self
            .purchases
            .find_by_id_and_status(purchase_id, TransactionStatus::WaitingForSeller)
            .await?
            .ok_or_else(|| BootCoinError::PurchaseAlreadyTaken {
                purchase_id: purchase_id.to_string(),
            })?;

        let seller = self
            .users
            .find_by_document(&request.seller_document)
            .await?
            .ok_or_else(|| BootCoinError::UserNotFound {
                document: request.seller_document.clone(),
            })?;
        if !seller.rail_enabled(purchase.rail) {
            return Err(BootCoinError::RailNotEnabled {
                document: seller.document_number,
                rail: purchase.rail,
            });
        }
        if request.address.rail() != purchase.rail || !seller.address_matches(&request.address) {
            return Err(BootCoinError::RailAddressMismatch {
                rail: purchase.rail,
            });
        }
        if seller.balance < purchase.amount {
            return Err(BootCoinError::InsufficientBalance {
                document: seller.document_number,
                available: seller.balance,
                required: purchase.amount,
            });
        }

        let claimed = self
            .purchases
            .assign_seller(
                purchase_id,
                request.seller_document.clone(),
                request.address,
            )
            .await?;

        let event = PurchaseSettlementRequested::from_purchase(&claimed, request.seller_document);
        self.publisher
            .publish(settlement_topic(claimed.rail), encode(&event)?)
            .await?;
        info!(
            "purchase {} claimed by {}; settlement requested over {}",
            claimed.id, event.seller_document, claimed.rail
        );
        Ok(PurchaseView::from(&claimed))
    }

    /// Apply an inbound settlement confirmation
    ///
    /// Unknown ids are *not-found*. Replays for an already-terminal purchase
    /// return it unchanged; only the first `Completed` outcome writes the
    /// history record and moves balances.
    pub async fn apply_settlement(&self, result: PurchaseSettlementResult) -> Result<Purchase> {
        let status = if result.success {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Failed
        };

        match self
            .purchases
            .finalize(&result.purchase_id, status, result.message)
            .await?
        {
            FinalizeOutcome::AlreadyTerminal(purchase) => {
                info!(
                    "duplicate settlement for purchase {} ignored (already {})",
                    purchase.id, purchase.status
                );
                Ok(purchase)
            }
            FinalizeOutcome::Updated(purchase) => {
                if purchase.status == TransactionStatus::Completed {
                    self.ledger.settle_purchase(&purchase).await?;
                }
                Ok(purchase)
            }
        }
    }
}

fn settlement_topic(rail: PaymentRail) -> &'static str {
    match rail {
        PaymentRail::Wallet => topics::WALLET_SETTLEMENT_REQUESTED,
        PaymentRail::BankTransfer => topics::TRANSFER_SETTLEMENT_REQUESTED,
    }
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(BootCoinError::invalid_amount(
            "purchase amount must be greater than zero",
        ));
    }
    Ok(())
}
