//! Payment rails
//!
//! A rail is the payment channel used to move local currency: the customer's
//! mobile-wallet account or their bank-transfer account.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The payment channel a purchase settles over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentRail {
    /// Mobile-wallet account, addressed by phone number
    Wallet,
    /// Bank-transfer account, addressed by account number
    BankTransfer,
}

impl fmt::Display for PaymentRail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentRail::Wallet => write!(f, "wallet"),
            PaymentRail::BankTransfer => write!(f, "bank-transfer"),
        }
    }
}

/// The rail-specific identifier a counterparty is reached at
///
/// A phone number for the wallet rail, an account number for the transfer
/// rail. The two are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RailAddress {
    /// Mobile-wallet phone number
    Phone(String),
    /// Bank account number
    Account(String),
}

impl RailAddress {
    /// The rail this address belongs to
    pub fn rail(&self) -> PaymentRail {
        match self {
            RailAddress::Phone(_) => PaymentRail::Wallet,
            RailAddress::Account(_) => PaymentRail::BankTransfer,
        }
    }

    /// The phone number, if this is a wallet address
    pub fn phone(&self) -> Option<&str> {
        match self {
            RailAddress::Phone(phone) => Some(phone),
            RailAddress::Account(_) => None,
        }
    }

    /// The account number, if this is a transfer address
    pub fn account(&self) -> Option<&str> {
        match self {
            RailAddress::Phone(_) => None,
            RailAddress::Account(account) => Some(account),
        }
    }
}
