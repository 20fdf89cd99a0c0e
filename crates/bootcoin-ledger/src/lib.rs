//! Bootcoin Ledger - Balance settlement
//!
//! Invoked only after an external settlement confirmation. A completed P2P
//! purchase moves `amount` bootcoin from the seller to the buyer; a completed
//! bank-direct transaction credits the buyer. The paired mutation is a single
//! store operation, so no half-applied balance state exists.
//!
//! # Invariants
//!
//! 1. No negative balances; the debit side is checked before any mutation
//! 2. Every completed P2P settlement leaves one immutable history record
//! 3. A failed settlement outcome moves no balances

use std::sync::Arc;

use bootcoin_store::{SettlementHistory, UserDirectory};
use bootcoin_types::{
    BankTransaction, BootCoinError, BootCoinUser, Purchase, Result, SettlementRecord,
    SettlementRecordId,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

/// Applies settlement outcomes to user balances
#[derive(Clone)]
pub struct BalanceLedger {
    users: Arc<dyn UserDirectory>,
    history: Arc<dyn SettlementHistory>,
}

impl BalanceLedger {
    pub fn new(users: Arc<dyn UserDirectory>, history: Arc<dyn SettlementHistory>) -> Self {
        Self { users, history }
    }

    /// Settle a completed P2P purchase
    ///
    /// Appends the immutable settlement record, then credits the buyer and
    /// debits the seller as one atomic pair. A transfer failure (seller spent
    /// down between accept and confirmation) propagates with both balances
    /// untouched; the history record still marks the confirmed settlement.
    pub async fn settle_purchase(&self, purchase: &Purchase) -> Result<SettlementRecord> {
        let seller_document =
            purchase
                .seller_document
                .clone()
                .ok_or_else(|| {
                    BootCoinError::store(format!(
                        "purchase {} confirmed without a seller assigned",
                        purchase.id
                    ))
                })?;
        ensure_positive(purchase.amount)?;

        let record = self
            .history
            .append(SettlementRecord {
                id: SettlementRecordId::new(),
                purchase_id: purchase.id.clone(),
                rail: purchase.rail,
                amount: purchase.amount,
                total_amount: purchase.total_amount,
                buyer_document: purchase.buyer_document.clone(),
                seller_document: seller_document.clone(),
                buyer_phone: purchase.buyer_phone.clone(),
                seller_phone: purchase.seller_phone.clone(),
                buyer_account: purchase.buyer_account.clone(),
                seller_account: purchase.seller_account.clone(),
                recorded_at: Utc::now(),
            })
            .await?;

        self.users
            .transfer_balance(&purchase.buyer_document, &seller_document, purchase.amount)
            .await?;

        info!(
            "purchase {} settled: {} bootcoin {} -> {}",
            purchase.id, purchase.amount, seller_document, purchase.buyer_document
        );
        Ok(record)
    }

    /// Credit the buyer of a completed bank-direct transaction
    pub async fn credit_buyer(&self, transaction: &BankTransaction) -> Result<BootCoinUser> {
        ensure_positive(transaction.amount)?;
        let user = self
            .users
            .credit_balance(&transaction.buyer_document, transaction.amount)
            .await?;
        info!(
            "bank transaction {} settled: {} bootcoin credited to {}",
            transaction.id, transaction.amount, transaction.buyer_document
        );
        Ok(user)
    }
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(BootCoinError::invalid_amount(
            "settlement amount must be greater than zero",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootcoin_store::{InMemorySettlementHistory, InMemoryUserDirectory};
    use bootcoin_types::{PaymentRail, RailAddress, TransactionStatus};
    use rust_decimal_macros::dec;

    async fn ledger_with_users(
        buyer_balance: Decimal,
        seller_balance: Decimal,
    ) -> (BalanceLedger, Arc<InMemoryUserDirectory>, Arc<InMemorySettlementHistory>) {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let mut buyer = BootCoinUser::new("buyer", "999111222", "buyer@mail.pe");
        buyer.wallet_enabled = true;
        buyer.balance = buyer_balance;
        let mut seller = BootCoinUser::new("seller", "988777666", "seller@mail.pe");
        seller.wallet_enabled = true;
        seller.balance = seller_balance;
        directory.insert(buyer).await;
        directory.insert(seller).await;

        let history = Arc::new(InMemorySettlementHistory::new());
        let ledger = BalanceLedger::new(directory.clone(), history.clone());
        (ledger, directory, history)
    }

    fn completed_purchase(amount: Decimal) -> Purchase {
        let mut buyer = BootCoinUser::new("buyer", "999111222", "buyer@mail.pe");
        buyer.wallet_enabled = true;
        let mut purchase = Purchase::advertise(&buyer, PaymentRail::Wallet, amount, amount * dec!(3.85));
        purchase.assign_seller(
            "seller".to_string(),
            &RailAddress::Phone("988777666".into()),
        );
        purchase.finalize(TransactionStatus::Completed, None);
        purchase
    }

    #[tokio::test]
    async fn settlement_moves_exactly_the_amount() {
        let (ledger, directory, history) = ledger_with_users(dec!(0), dec!(25)).await;
        let purchase = completed_purchase(dec!(10));

        let record = ledger.settle_purchase(&purchase).await.unwrap();
        assert_eq!(record.purchase_id, purchase.id);

        let buyer = directory.find_by_document("buyer").await.unwrap().unwrap();
        let seller = directory.find_by_document("seller").await.unwrap().unwrap();
        assert_eq!(buyer.balance, dec!(10));
        assert_eq!(seller.balance, dec!(15));
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn transfer_failure_leaves_balances_untouched() {
        let (ledger, directory, history) = ledger_with_users(dec!(0), dec!(4)).await;
        let purchase = completed_purchase(dec!(10));

        let result = ledger.settle_purchase(&purchase).await;
        assert!(matches!(
            result,
            Err(BootCoinError::InsufficientBalance { .. })
        ));

        let buyer = directory.find_by_document("buyer").await.unwrap().unwrap();
        let seller = directory.find_by_document("seller").await.unwrap().unwrap();
        assert_eq!(buyer.balance, dec!(0));
        assert_eq!(seller.balance, dec!(4));
        // The confirmed settlement is still on record
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn purchase_without_seller_is_rejected() {
        let (ledger, _, history) = ledger_with_users(dec!(0), dec!(25)).await;
        let mut buyer = BootCoinUser::new("buyer", "999111222", "buyer@mail.pe");
        buyer.wallet_enabled = true;
        let purchase = Purchase::advertise(&buyer, PaymentRail::Wallet, dec!(10), dec!(38.50));

        let result = ledger.settle_purchase(&purchase).await;
        assert!(matches!(result, Err(BootCoinError::Store { .. })));
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn bank_settlement_credits_the_buyer() {
        let (ledger, directory, _) = ledger_with_users(dec!(3), dec!(0)).await;
        let transaction = BankTransaction::request("buyer", "191-555", dec!(8), dec!(29.60));

        let updated = ledger.credit_buyer(&transaction).await.unwrap();
        assert_eq!(updated.balance, dec!(11));
        assert_eq!(
            directory
                .find_by_document("buyer")
                .await
                .unwrap()
                .unwrap()
                .balance,
            dec!(11)
        );
    }
}
