//! Bootcoin Messaging - Transport contract for settlement and validation events
//!
//! The broker's wire format is out of scope; the core publishes serde-encoded
//! payloads on named topics and consumes inbound events through the saga and
//! bridge entry points. Delivery is at-least-once: duplicates and reordering
//! are expected and handled by the consumers.

use std::sync::Arc;

use async_trait::async_trait;
use bootcoin_types::{BootCoinError, Result};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Topic names for every flow in the exchange
pub mod topics {
    /// Settlement request for a purchase settling over the transfer rail
    pub const TRANSFER_SETTLEMENT_REQUESTED: &str = "bootcoin.transaction.transfer.requested";
    /// Settlement request for a purchase settling over the wallet rail
    pub const WALLET_SETTLEMENT_REQUESTED: &str = "bootcoin.transaction.wallet.requested";
    /// Inbound settlement confirmations for P2P purchases
    pub const SETTLEMENT_PROCESSED: &str = "bootcoin.transaction.processed";
    /// Settlement request for a bank-direct transaction
    pub const BANK_PURCHASE_REQUESTED: &str = "bootcoin.bank.purchase.requested";
    /// Inbound settlement confirmations for bank-direct transactions
    pub const BANK_PURCHASE_PROCESSED: &str = "bootcoin.bank.purchase.processed";
    /// Wallet-association validation requests
    pub const WALLET_ASSOCIATION: &str = "bootcoin.wallet.association";
    /// Bank-account-association validation requests
    pub const BANK_ACCOUNT_ASSOCIATION: &str = "bootcoin.bank.account.association";
    /// Inbound answers to association validation requests
    pub const VALIDATION_RESPONSE: &str = "bootcoin.validation.response";
}

/// Fire-and-forget publication onto the messaging transport
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Value) -> Result<()>;
}

/// Encode an event for publication
pub fn encode<T: Serialize>(event: &T) -> Result<Value> {
    serde_json::to_value(event)
        .map_err(|e| BootCoinError::transport(format!("failed to encode event: {e}")))
}

/// A message captured by the in-memory bus
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Value,
}

/// In-memory transport: records everything published and fans out to live
/// subscribers
///
/// Stands in for the broker in tests and local wiring, the same way the
/// settlement engine's in-memory channel stands in for a real rail.
pub struct InMemoryBus {
    log: Arc<RwLock<Vec<PublishedMessage>>>,
    broadcaster: broadcast::Sender<PublishedMessage>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            log: Arc::new(RwLock::new(Vec::new())),
            broadcaster: tx,
        }
    }

    /// Everything published so far, in order
    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.log.read().await.clone()
    }

    /// Payloads published on one topic, in order
    pub async fn published_on(&self, topic: &str) -> Vec<Value> {
        self.log
            .read()
            .await
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.payload.clone())
            .collect()
    }

    /// Subscribe to live publications
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedMessage> {
        self.broadcaster.subscribe()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryBus {
    async fn publish(&self, topic: &str, payload: Value) -> Result<()> {
        debug!("publishing on {topic}");
        let message = PublishedMessage {
            topic: topic.to_string(),
            payload,
        };
        self.log.write().await.push(message.clone());
        // No subscribers is fine
        let _ = self.broadcaster.send(message);
        Ok(())
    }
}
