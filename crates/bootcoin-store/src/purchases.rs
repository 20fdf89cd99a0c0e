//! Purchase store contract and in-memory implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bootcoin_types::{
    BootCoinError, Purchase, PurchaseId, RailAddress, Result, TransactionStatus,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::FinalizeOutcome;

/// Store of P2P purchases
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    async fn save(&self, purchase: Purchase) -> Result<Purchase>;

    async fn find_by_id(&self, id: &PurchaseId) -> Result<Option<Purchase>>;

    async fn find_by_status(&self, status: TransactionStatus) -> Result<Vec<Purchase>>;

    async fn find_by_id_and_status(
        &self,
        id: &PurchaseId,
        status: TransactionStatus,
    ) -> Result<Option<Purchase>>;

    /// Assign a seller iff the purchase is still `WaitingForSeller`
    ///
    /// The status check and the seller assignment happen as one store
    /// operation, so exactly one of any number of concurrent acceptors
    /// succeeds. Losers (and unknown ids) get *purchase-already-taken*.
    async fn assign_seller(
        &self,
        id: &PurchaseId,
        seller_document: String,
        address: RailAddress,
    ) -> Result<Purchase>;

    /// Move a purchase into a terminal status, once
    ///
    /// An already-terminal purchase is returned unchanged as
    /// [`FinalizeOutcome::AlreadyTerminal`]; an unknown id is *not-found*.
    async fn finalize(
        &self,
        id: &PurchaseId,
        status: TransactionStatus,
        message: Option<String>,
    ) -> Result<FinalizeOutcome<Purchase>>;
}

/// In-memory purchase store
pub struct InMemoryPurchaseStore {
    purchases: Arc<RwLock<HashMap<PurchaseId, Purchase>>>,
}

impl InMemoryPurchaseStore {
    pub fn new() -> Self {
        Self {
            purchases: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryPurchaseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PurchaseStore for InMemoryPurchaseStore {
    async fn save(&self, purchase: Purchase) -> Result<Purchase> {
        self.purchases
            .write()
            .await
            .insert(purchase.id.clone(), purchase.clone());
        Ok(purchase)
    }

    async fn find_by_id(&self, id: &PurchaseId) -> Result<Option<Purchase>> {
        Ok(self.purchases.read().await.get(id).cloned())
    }

    async fn find_by_status(&self, status: TransactionStatus) -> Result<Vec<Purchase>> {
        Ok(self
            .purchases
            .read()
            .await
            .values()
            .filter(|purchase| purchase.status == status)
            .cloned()
            .collect())
    }

    async fn find_by_id_and_status(
        &self,
        id: &PurchaseId,
        status: TransactionStatus,
    ) -> Result<Option<Purchase>> {
        Ok(self
            .purchases
            .read()
            .await
            .get(id)
            .filter(|purchase| purchase.status == status)
            .cloned())
    }

    async fn assign_seller(
        &self,
        id: &PurchaseId,
        seller_document: String,
        address: RailAddress,
    ) -> Result<Purchase> {
        let mut purchases = self.purchases.write().await;
        let purchase = purchases
            .get_mut(id)
            .filter(|purchase| purchase.status == TransactionStatus::WaitingForSeller)
            .ok_or_else(|| BootCoinError::PurchaseAlreadyTaken {
                purchase_id: id.to_string(),
            })?;

        purchase.assign_seller(seller_document, &address);
        info!("purchase {id} claimed, now {}", purchase.status);
        Ok(purchase.clone())
    }

    async fn finalize(
        &self,
        id: &PurchaseId,
        status: TransactionStatus,
        message: Option<String>,
    ) -> Result<FinalizeOutcome<Purchase>> {
        if !status.is_terminal() {
            return Err(BootCoinError::store(format!(
                "finalize requires a terminal status, got {status}"
            )));
        }

        let mut purchases = self.purchases.write().await;
        let purchase = purchases
            .get_mut(id)
            .ok_or_else(|| BootCoinError::PurchaseNotFound {
                purchase_id: id.to_string(),
            })?;

        if purchase.status.is_terminal() {
            return Ok(FinalizeOutcome::AlreadyTerminal(purchase.clone()));
        }
        if !purchase.status.can_transition_to(status) {
            return Err(BootCoinError::store(format!(
                "purchase {id} cannot move {} -> {status}",
                purchase.status
            )));
        }

        purchase.finalize(status, message);
        info!("purchase {id} finalized as {status}");
        Ok(FinalizeOutcome::Updated(purchase.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootcoin_types::{BootCoinUser, PaymentRail};
    use rust_decimal_macros::dec;

    fn advertised() -> Purchase {
        let mut buyer = BootCoinUser::new("44556677", "999111222", "buyer@mail.pe");
        buyer.wallet_enabled = true;
        Purchase::advertise(&buyer, PaymentRail::Wallet, dec!(10), dec!(38.50))
    }

    #[tokio::test]
    async fn conditional_lookup_filters_on_status() {
        let store = InMemoryPurchaseStore::new();
        let purchase = store.save(advertised()).await.unwrap();

        assert!(store
            .find_by_id_and_status(&purchase.id, TransactionStatus::WaitingForSeller)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_id_and_status(&purchase.id, TransactionStatus::Processing)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn second_assignment_loses() {
        let store = InMemoryPurchaseStore::new();
        let purchase = store.save(advertised()).await.unwrap();

        store
            .assign_seller(
                &purchase.id,
                "88997766".to_string(),
                RailAddress::Phone("988777666".into()),
            )
            .await
            .unwrap();

        let second = store
            .assign_seller(
                &purchase.id,
                "11223344".to_string(),
                RailAddress::Phone("911222333".into()),
            )
            .await;
        assert!(matches!(
            second,
            Err(BootCoinError::PurchaseAlreadyTaken { .. })
        ));

        // The winner's fields survive
        let stored = store.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(stored.seller_document.as_deref(), Some("88997766"));
    }

    #[tokio::test]
    async fn finalize_is_idempotent() {
        let store = InMemoryPurchaseStore::new();
        let purchase = store.save(advertised()).await.unwrap();
        store
            .assign_seller(
                &purchase.id,
                "88997766".to_string(),
                RailAddress::Phone("988777666".into()),
            )
            .await
            .unwrap();

        let first = store
            .finalize(&purchase.id, TransactionStatus::Completed, None)
            .await
            .unwrap();
        assert!(matches!(first, FinalizeOutcome::Updated(_)));

        let replay = store
            .finalize(&purchase.id, TransactionStatus::Completed, None)
            .await
            .unwrap();
        assert!(matches!(replay, FinalizeOutcome::AlreadyTerminal(_)));
    }

    #[tokio::test]
    async fn finalize_unknown_id_is_not_found() {
        let store = InMemoryPurchaseStore::new();
        let result = store
            .finalize(&PurchaseId::new(), TransactionStatus::Failed, None)
            .await;
        assert!(matches!(result, Err(BootCoinError::PurchaseNotFound { .. })));
    }

    #[tokio::test]
    async fn finalize_rejects_non_terminal_target() {
        let store = InMemoryPurchaseStore::new();
        let purchase = store.save(advertised()).await.unwrap();
        let result = store
            .finalize(&purchase.id, TransactionStatus::Processing, None)
            .await;
        assert!(matches!(result, Err(BootCoinError::Store { .. })));
    }
}
