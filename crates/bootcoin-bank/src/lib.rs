//! Bootcoin Bank - Bank-direct transaction orchestrator
//!
//! Single-party analogue of the P2P saga: the customer sells bootcoin
//! straight to the bank, which confirms settlement out of band.
//!
//! ```text
//! request_transaction     PENDING                (settlement requested)
//! process_result          PENDING → COMPLETED | FAILED   (credit on COMPLETED)
//! ```
//!
//! There is no seller-matching phase; the request is priced at the buy rate,
//! because the bank is buying from the customer.

use std::sync::Arc;

use bootcoin_ledger::BalanceLedger;
use bootcoin_messaging::{encode, topics, MessagePublisher};
use bootcoin_rates::RateProvider;
use bootcoin_store::{BankTransactionStore, FinalizeOutcome, UserDirectory};
use bootcoin_types::{
    BankPurchaseCompleted, BankPurchaseRequested, BankTransaction, BankTransactionId,
    BootCoinError, Result, TransactionStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A customer's request to sell bootcoin to the bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransactionRequest {
    pub buyer_document: String,
    /// Must equal the account registered on the customer's profile
    pub buyer_account: String,
    /// Requested amount in bootcoin
    pub amount: Decimal,
}

/// Public projection of a bank-direct transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransactionView {
    pub transaction_id: BankTransactionId,
    pub buyer_document: String,
    pub amount: Decimal,
    pub total_amount: Decimal,
    pub buyer_account: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&BankTransaction> for BankTransactionView {
    fn from(transaction: &BankTransaction) -> Self {
        Self {
            transaction_id: transaction.id.clone(),
            buyer_document: transaction.buyer_document.clone(),
            amount: transaction.amount,
            total_amount: transaction.total_amount,
            buyer_account: transaction.buyer_account.clone(),
            status: transaction.status,
            created_at: transaction.created_at,
        }
    }
}

/// Orchestrates the bank-direct transaction lifecycle
pub struct BankTransactionService {
    transactions: Arc<dyn BankTransactionStore>,
    users: Arc<dyn UserDirectory>,
    rates: Arc<dyn RateProvider>,
    publisher: Arc<dyn MessagePublisher>,
    ledger: BalanceLedger,
}

impl BankTransactionService {
    pub fn new(
        transactions: Arc<dyn BankTransactionStore>,
        users: Arc<dyn UserDirectory>,
        rates: Arc<dyn RateProvider>,
        publisher: Arc<dyn MessagePublisher>,
        ledger: BalanceLedger,
    ) -> Self {
        Self {
            transactions,
            users,
            rates,
            publisher,
            ledger,
        }
    }

    /// Open a transaction and request settlement from the bank
    ///
    /// The supplied account must equal the one registered on the customer's
    /// profile; a mismatch rejects the request before anything is persisted
    /// or published.
    pub async fn request_transaction(
        &self,
        request: BankTransactionRequest,
    ) -> Result<BankTransactionView> {
        if request.amount <= Decimal::ZERO {
            return Err(BootCoinError::invalid_amount(
                "transaction amount must be greater than zero",
            ));
        }

        let user = self
            .users
            .find_by_document(&request.buyer_document)
            .await?
            .ok_or_else(|| BootCoinError::UserNotFound {
                document: request.buyer_document.clone(),
            })?;
        let accounts_match = user.bank_account_id.as_deref() == Some(request.buyer_account.as_str());
        if !accounts_match {
            return Err(BootCoinError::AccountMismatch {
                document: user.document_number,
            });
        }

        let rate = self.rates.current_rate().await?;
        let total_amount = request.amount * rate.buy_rate;

        let transaction = self
            .transactions
            .save(BankTransaction::request(
                request.buyer_document,
                request.buyer_account,
                request.amount,
                total_amount,
            ))
            .await?;

        let event = BankPurchaseRequested::from_transaction(&transaction);
        self.publisher
            .publish(topics::BANK_PURCHASE_REQUESTED, encode(&event)?)
            .await?;
        info!(
            "bank transaction {} opened by {}: {} bootcoin at {} = {}",
            transaction.id,
            transaction.buyer_document,
            transaction.amount,
            rate.buy_rate,
            total_amount
        );
        Ok(BankTransactionView::from(&transaction))
    }

    /// Apply the bank's settlement confirmation
    ///
    /// Unknown ids are *not-found*. Replays for an already-terminal
    /// transaction return it unchanged; only the first accepted outcome
    /// credits the buyer. A rejection persists `Failed` and moves no balance.
    pub async fn process_result(&self, event: BankPurchaseCompleted) -> Result<BankTransaction> {
        let status = if event.accepted {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Failed
        };

        match self
            .transactions
            .finalize(&event.transaction_id, status, event.message)
            .await?
        {
            FinalizeOutcome::AlreadyTerminal(transaction) => {
                info!(
                    "duplicate bank settlement for {} ignored (already {})",
                    transaction.id, transaction.status
                );
                Ok(transaction)
            }
            FinalizeOutcome::Updated(transaction) => {
                if transaction.status == TransactionStatus::Completed {
                    self.ledger.credit_buyer(&transaction).await?;
                }
                Ok(transaction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootcoin_messaging::InMemoryBus;
    use bootcoin_rates::InMemoryRateCache;
    use bootcoin_store::{
        InMemoryBankTransactionStore, InMemorySettlementHistory, InMemoryUserDirectory,
    };
    use bootcoin_types::BootCoinUser;
    use rust_decimal_macros::dec;

    struct Fixture {
        service: BankTransactionService,
        users: Arc<InMemoryUserDirectory>,
        bus: Arc<InMemoryBus>,
    }

    async fn fixture() -> Fixture {
        let transactions = Arc::new(InMemoryBankTransactionStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let bus = Arc::new(InMemoryBus::new());
        let rates = Arc::new(InMemoryRateCache::with_rate(dec!(3.70), dec!(3.85)));
        let ledger = BalanceLedger::new(users.clone(), Arc::new(InMemorySettlementHistory::new()));
        let service = BankTransactionService::new(
            transactions,
            users.clone(),
            rates,
            bus.clone(),
            ledger,
        );
        Fixture { service, users, bus }
    }

    async fn seed_customer(fx: &Fixture, account: &str) {
        let mut user = BootCoinUser::new("44556677", "999111222", "customer@mail.pe");
        user.bank_account_id = Some(account.to_string());
        fx.users.insert(user).await;
    }

    fn request(account: &str, amount: Decimal) -> BankTransactionRequest {
        BankTransactionRequest {
            buyer_document: "44556677".to_string(),
            buyer_account: account.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn request_prices_at_the_buy_rate() {
        let fx = fixture().await;
        seed_customer(&fx, "456").await;

        let view = fx.service.request_transaction(request("456", dec!(8))).await.unwrap();
        assert_eq!(view.status, TransactionStatus::Pending);
        assert_eq!(view.total_amount, dec!(29.60));

        let published = fx.bus.published_on(topics::BANK_PURCHASE_REQUESTED).await;
        assert_eq!(published.len(), 1);
        let event: BankPurchaseRequested = serde_json::from_value(published[0].clone()).unwrap();
        assert_eq!(event.transaction_id, view.transaction_id);
        assert_eq!(event.buyer_account, "456");
    }

    #[tokio::test]
    async fn account_mismatch_persists_and_publishes_nothing() {
        let fx = fixture().await;
        seed_customer(&fx, "456").await;

        let result = fx.service.request_transaction(request("123", dec!(8))).await;
        assert!(matches!(result, Err(BootCoinError::AccountMismatch { .. })));
        assert!(fx.bus.published().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let fx = fixture().await;
        let result = fx.service.request_transaction(request("456", dec!(8))).await;
        assert!(matches!(result, Err(BootCoinError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn accepted_result_credits_the_buyer_once() {
        let fx = fixture().await;
        seed_customer(&fx, "456").await;
        let view = fx.service.request_transaction(request("456", dec!(8))).await.unwrap();

        let settled = fx
            .service
            .process_result(BankPurchaseCompleted {
                transaction_id: view.transaction_id.clone(),
                accepted: true,
                message: None,
            })
            .await
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Completed);

        let user = fx.users.find_by_document("44556677").await.unwrap().unwrap();
        assert_eq!(user.balance, dec!(8));

        // Replay is a no-op
        let replay = fx
            .service
            .process_result(BankPurchaseCompleted {
                transaction_id: view.transaction_id,
                accepted: true,
                message: None,
            })
            .await
            .unwrap();
        assert_eq!(replay.status, TransactionStatus::Completed);
        let user = fx.users.find_by_document("44556677").await.unwrap().unwrap();
        assert_eq!(user.balance, dec!(8));
    }

    #[tokio::test]
    async fn rejected_result_moves_no_balance() {
        let fx = fixture().await;
        seed_customer(&fx, "456").await;
        let view = fx.service.request_transaction(request("456", dec!(8))).await.unwrap();

        let settled = fx
            .service
            .process_result(BankPurchaseCompleted {
                transaction_id: view.transaction_id,
                accepted: false,
                message: Some("bank declined".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Failed);
        assert_eq!(settled.message.as_deref(), Some("bank declined"));

        let user = fx.users.find_by_document("44556677").await.unwrap().unwrap();
        assert_eq!(user.balance, dec!(0));
    }

    #[tokio::test]
    async fn result_for_unknown_transaction_is_not_found() {
        let fx = fixture().await;
        let result = fx
            .service
            .process_result(BankPurchaseCompleted {
                transaction_id: BankTransactionId::new(),
                accepted: true,
                message: None,
            })
            .await;
        assert!(matches!(
            result,
            Err(BootCoinError::TransactionNotFound { .. })
        ));
    }
}
