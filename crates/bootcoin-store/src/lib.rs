//! Bootcoin Store - Document-store collaborator contracts
//!
//! The production deployment maps these contracts onto a document store; the
//! in-memory implementations here honor the same semantics and back the test
//! suites. Beyond the plain find/save surface, the contracts carry the
//! conditional operations the sagas rely on:
//!
//! - `PurchaseStore::assign_seller` — status-guarded seller assignment, so at
//!   most one concurrent acceptor wins a purchase
//! - `finalize` (purchases and bank transactions) — status-guarded terminal
//!   transition, so replayed settlement events are no-ops
//! - `UserDirectory::transfer_balance` — paired balance mutation applied
//!   atomically, both records or neither

pub mod directory;
pub mod history;
pub mod purchases;
pub mod transactions;

pub use directory::{InMemoryUserDirectory, UserDirectory};
pub use history::{InMemorySettlementHistory, SettlementHistory};
pub use purchases::{InMemoryPurchaseStore, PurchaseStore};
pub use transactions::{BankTransactionStore, InMemoryBankTransactionStore};

/// Outcome of a status-guarded terminal transition
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome<T> {
    /// The record moved into the terminal status now
    Updated(T),
    /// The record was already terminal; nothing changed
    AlreadyTerminal(T),
}

impl<T> FinalizeOutcome<T> {
    /// The record, whichever branch was taken
    pub fn into_record(self) -> T {
        match self {
            FinalizeOutcome::Updated(record) => record,
            FinalizeOutcome::AlreadyTerminal(record) => record,
        }
    }
}
