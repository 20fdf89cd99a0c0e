//! Bootcoin user records
//!
//! Users are keyed by their document number, a stable external identity.
//! Balances are mutated only by the balance ledger during settlement.

use crate::rail::{PaymentRail, RailAddress};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer enrolled in the bootcoin exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootCoinUser {
    /// Stable external identity (national document number)
    pub document_number: String,
    /// Mobile-wallet phone number
    pub phone_number: String,
    pub email: String,
    /// Bootcoin balance; never negative
    pub balance: Decimal,
    /// Whether the mobile-wallet rail is enabled
    pub wallet_enabled: bool,
    /// Linked bank-transfer account, if any
    pub bank_account_id: Option<String>,
}

impl BootCoinUser {
    /// Enroll a new user with a zero balance
    pub fn new(
        document_number: impl Into<String>,
        phone_number: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            document_number: document_number.into(),
            phone_number: phone_number.into(),
            email: email.into(),
            balance: Decimal::ZERO,
            wallet_enabled: false,
            bank_account_id: None,
        }
    }

    /// Whether the given rail may be used by this user
    pub fn rail_enabled(&self, rail: PaymentRail) -> bool {
        match rail {
            PaymentRail::Wallet => self.wallet_enabled,
            PaymentRail::BankTransfer => self
                .bank_account_id
                .as_ref()
                .is_some_and(|account| !account.is_empty()),
        }
    }

    /// Whether the supplied address matches this user's registered identifier
    /// for its rail
    pub fn address_matches(&self, address: &RailAddress) -> bool {
        match address {
            RailAddress::Phone(phone) => self.phone_number == *phone,
            RailAddress::Account(account) => {
                self.bank_account_id.as_deref() == Some(account.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_starts_at_zero() {
        let user = BootCoinUser::new("44556677", "999111222", "a@b.pe");
        assert_eq!(user.balance, Decimal::ZERO);
        assert!(!user.wallet_enabled);
        assert!(user.bank_account_id.is_none());
    }

    #[test]
    fn transfer_rail_requires_nonempty_account() {
        let mut user = BootCoinUser::new("44556677", "999111222", "a@b.pe");
        assert!(!user.rail_enabled(PaymentRail::BankTransfer));
        user.bank_account_id = Some(String::new());
        assert!(!user.rail_enabled(PaymentRail::BankTransfer));
        user.bank_account_id = Some("191-555".into());
        assert!(user.rail_enabled(PaymentRail::BankTransfer));
    }

    #[test]
    fn address_match_is_per_rail() {
        let mut user = BootCoinUser::new("44556677", "999111222", "a@b.pe");
        user.bank_account_id = Some("191-555".into());
        assert!(user.address_matches(&RailAddress::Phone("999111222".into())));
        assert!(!user.address_matches(&RailAddress::Phone("000000000".into())));
        assert!(user.address_matches(&RailAddress::Account("191-555".into())));
        assert!(!user.address_matches(&RailAddress::Account("191-556".into())));
    }
}
