//! Bootcoin Rates - Exchange rate lookup
//!
//! The sagas only read the current rate; the write surface (save once,
//! update thereafter) belongs to the rate-administration flow. The cache
//! mechanics behind a production provider are out of scope; the in-memory
//! provider honors the same contract.

use std::sync::Arc;

use async_trait::async_trait;
use bootcoin_types::{BootCoinError, ExchangeRate, Result};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::info;

/// Read contract consumed by the sagas
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// The current buy/sell rate; fails when none has been cached
    async fn current_rate(&self) -> Result<ExchangeRate>;
}

/// In-memory cached rate with the save/update write surface
pub struct InMemoryRateCache {
    slot: Arc<RwLock<Option<ExchangeRate>>>,
}

impl InMemoryRateCache {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
        }
    }

    /// Start from a known rate (test and bootstrap convenience)
    pub fn with_rate(buy_rate: Decimal, sell_rate: Decimal) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(ExchangeRate::new(buy_rate, sell_rate)))),
        }
    }

    /// Cache the first rate; fails if one is already present
    pub async fn save_rate(&self, buy_rate: Decimal, sell_rate: Decimal) -> Result<ExchangeRate> {
        let mut slot = self.slot.write().await;
        if slot.is_some() {
            return Err(BootCoinError::RateAlreadyCached);
        }
        let rate = ExchangeRate::new(buy_rate, sell_rate);
        *slot = Some(rate);
        info!("exchange rate cached: buy={buy_rate}, sell={sell_rate}");
        Ok(rate)
    }

    /// Replace the cached rate; fails if none exists yet
    pub async fn update_rate(&self, buy_rate: Decimal, sell_rate: Decimal) -> Result<ExchangeRate> {
        let mut slot = self.slot.write().await;
        if slot.is_none() {
            return Err(BootCoinError::RateUnavailable);
        }
        let rate = ExchangeRate::new(buy_rate, sell_rate);
        *slot = Some(rate);
        info!("exchange rate updated: buy={buy_rate}, sell={sell_rate}");
        Ok(rate)
    }
}

impl Default for InMemoryRateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for InMemoryRateCache {
    async fn current_rate(&self) -> Result<ExchangeRate> {
        let slot = self.slot.read().await;
        slot.as_ref().copied().ok_or(BootCoinError::RateUnavailable)
    }
}
