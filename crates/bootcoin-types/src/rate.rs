//! Exchange rate snapshot
//!
//! The bank quotes two directions: the sell rate prices bootcoin sold to a
//! buyer (P2P flow), the buy rate prices bootcoin the bank buys back
//! (bank-direct flow).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current buy/sell price of one bootcoin in local currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Price the bank pays when buying bootcoin from a customer
    pub buy_rate: Decimal,
    /// Price a buyer pays per bootcoin
    pub sell_rate: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(buy_rate: Decimal, sell_rate: Decimal) -> Self {
        Self {
            buy_rate,
            sell_rate,
            updated_at: Utc::now(),
        }
    }
}
