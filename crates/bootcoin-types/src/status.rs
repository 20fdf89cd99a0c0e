//! Transaction status state machine
//!
//! P2P purchases move `WaitingForSeller → Processing → {Completed, Failed}`.
//! Bank-direct transactions move `Pending → {Completed, Failed}`.
//! Terminal states absorb; no other edge exists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status shared by P2P purchases and bank-direct transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Bank-direct transaction awaiting the bank's settlement confirmation
    Pending,
    /// P2P purchase advertised, no seller matched yet
    WaitingForSeller,
    /// Seller matched, settlement requested, awaiting confirmation
    Processing,
    /// Settlement confirmed, balances adjusted
    Completed,
    /// Settlement rejected or failed
    Failed,
}

impl TransactionStatus {
    /// Whether this status admits no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, next),
            (WaitingForSeller, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Pending, Completed)
                | (Pending, Failed)
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::WaitingForSeller => "WAITING_FOR_SELLER",
            TransactionStatus::Processing => "PROCESSING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransactionStatus::*;

    #[test]
    fn p2p_path_is_allowed() {
        assert!(WaitingForSeller.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
    }

    #[test]
    fn bank_path_is_allowed() {
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
    }

    #[test]
    fn terminal_states_absorb() {
        for terminal in [Completed, Failed] {
            assert!(terminal.is_terminal());
            for next in [Pending, WaitingForSeller, Processing, Completed, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn no_shortcut_edges() {
        assert!(!WaitingForSeller.can_transition_to(Completed));
        assert!(!WaitingForSeller.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Processing));
        assert!(!Processing.can_transition_to(WaitingForSeller));
    }
}
