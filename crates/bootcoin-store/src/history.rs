//! Settlement history contract and in-memory implementation
//!
//! Append-only. Records are written once, when a P2P purchase completes, and
//! never updated.

use std::sync::Arc;

use async_trait::async_trait;
use bootcoin_types::{PurchaseId, Result, SettlementRecord};
use tokio::sync::RwLock;

/// Archive of settled P2P purchases
#[async_trait]
pub trait SettlementHistory: Send + Sync {
    async fn append(&self, record: SettlementRecord) -> Result<SettlementRecord>;

    async fn find_by_purchase(&self, purchase_id: &PurchaseId) -> Result<Option<SettlementRecord>>;

    /// Most recent records first
    async fn recent(&self, limit: usize) -> Result<Vec<SettlementRecord>>;
}

/// In-memory settlement history
pub struct InMemorySettlementHistory {
    records: Arc<RwLock<Vec<SettlementRecord>>>,
}

impl InMemorySettlementHistory {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemorySettlementHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettlementHistory for InMemorySettlementHistory {
    async fn append(&self, record: SettlementRecord) -> Result<SettlementRecord> {
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn find_by_purchase(
        &self,
        purchase_id: &PurchaseId,
    ) -> Result<Option<SettlementRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|record| record.purchase_id == *purchase_id)
            .cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SettlementRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
