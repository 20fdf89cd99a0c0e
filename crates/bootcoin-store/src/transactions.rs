//! Bank transaction store contract and in-memory implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bootcoin_types::{
    BankTransaction, BankTransactionId, BootCoinError, Result, TransactionStatus,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::FinalizeOutcome;

/// Store of bank-direct transactions
#[async_trait]
pub trait BankTransactionStore: Send + Sync {
    async fn save(&self, transaction: BankTransaction) -> Result<BankTransaction>;

    async fn find_by_id(&self, id: &BankTransactionId) -> Result<Option<BankTransaction>>;

    /// Move a transaction into a terminal status, once
    ///
    /// Same guarantees as the purchase-side `finalize`: replays come back as
    /// [`FinalizeOutcome::AlreadyTerminal`], unknown ids as *not-found*.
    async fn finalize(
        &self,
        id: &BankTransactionId,
        status: TransactionStatus,
        message: Option<String>,
    ) -> Result<FinalizeOutcome<BankTransaction>>;
}

/// In-memory bank transaction store
pub struct InMemoryBankTransactionStore {
    transactions: Arc<RwLock<HashMap<BankTransactionId, BankTransaction>>>,
}

impl InMemoryBankTransactionStore {
    pub fn new() -> Self {
        Self {
            transactions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryBankTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BankTransactionStore for InMemoryBankTransactionStore {
    async fn save(&self, transaction: BankTransaction) -> Result<BankTransaction> {
        self.transactions
            .write()
            .await
            .insert(transaction.id.clone(), transaction.clone());
        Ok(transaction)
    }

    async fn find_by_id(&self, id: &BankTransactionId) -> Result<Option<BankTransaction>> {
        Ok(self.transactions.read().await.get(id).cloned())
    }

    async fn finalize(
        &self,
        id: &BankTransactionId,
        status: TransactionStatus,
        message: Option<String>,
    ) -> Result<FinalizeOutcome<BankTransaction>> {
        if !status.is_terminal() {
            return Err(BootCoinError::store(format!(
                "finalize requires a terminal status, got {status}"
            )));
        }

        let mut transactions = self.transactions.write().await;
        let transaction =
            transactions
                .get_mut(id)
                .ok_or_else(|| BootCoinError::TransactionNotFound {
                    transaction_id: id.to_string(),
                })?;

        if transaction.status.is_terminal() {
            return Ok(FinalizeOutcome::AlreadyTerminal(transaction.clone()));
        }
        if !transaction.status.can_transition_to(status) {
            return Err(BootCoinError::store(format!(
                "transaction {id} cannot move {} -> {status}",
                transaction.status
            )));
        }

        transaction.finalize(status, message);
        info!("bank transaction {id} finalized as {status}");
        Ok(FinalizeOutcome::Updated(transaction.clone()))
    }
}
