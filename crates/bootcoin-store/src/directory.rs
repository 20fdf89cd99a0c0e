//! User directory contract and in-memory implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bootcoin_types::{BootCoinError, BootCoinUser, Result};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::info;

/// Directory of enrolled users, keyed by document number
///
/// Balance mutation goes through the two atomic operations below; plain
/// `save` is reserved for enrollment and association flows. The store
/// serializes balance mutation per record.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_document(&self, document: &str) -> Result<Option<BootCoinUser>>;

    async fn find_by_phone_and_document(
        &self,
        phone: &str,
        document: &str,
    ) -> Result<Option<BootCoinUser>>;

    async fn save(&self, user: BootCoinUser) -> Result<BootCoinUser>;

    /// Credit one user and debit another by `amount`, as one operation
    ///
    /// Applies both mutations or neither. Fails with *insufficient-balance*
    /// when the debited user holds less than `amount`, before any mutation.
    async fn transfer_balance(
        &self,
        credit_document: &str,
        debit_document: &str,
        amount: Decimal,
    ) -> Result<()>;

    /// Credit a single user by `amount`
    async fn credit_balance(&self, document: &str, amount: Decimal) -> Result<BootCoinUser>;
}

/// In-memory user directory
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<String, BootCoinUser>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed the directory (test convenience)
    pub async fn insert(&self, user: BootCoinUser) {
        self.users
            .write()
            .await
            .insert(user.document_number.clone(), user);
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_document(&self, document: &str) -> Result<Option<BootCoinUser>> {
        Ok(self.users.read().await.get(document).cloned())
    }

    async fn find_by_phone_and_document(
        &self,
        phone: &str,
        document: &str,
    ) -> Result<Option<BootCoinUser>> {
        Ok(self
            .users
            .read()
            .await
            .get(document)
            .filter(|user| user.phone_number == phone)
            .cloned())
    }

    async fn save(&self, user: BootCoinUser) -> Result<BootCoinUser> {
        self.users
            .write()
            .await
            .insert(user.document_number.clone(), user.clone());
        Ok(user)
    }

    async fn transfer_balance(
        &self,
        credit_document: &str,
        debit_document: &str,
        amount: Decimal,
    ) -> Result<()> {
        let mut users = self.users.write().await;

        let mut debited = users
            .get(debit_document)
            .cloned()
            .ok_or_else(|| BootCoinError::UserNotFound {
                document: debit_document.to_string(),
            })?;
        let mut credited = users
            .get(credit_document)
            .cloned()
            .ok_or_else(|| BootCoinError::UserNotFound {
                document: credit_document.to_string(),
            })?;

        if debited.balance < amount {
            return Err(BootCoinError::InsufficientBalance {
                document: debit_document.to_string(),
                available: debited.balance,
                required: amount,
            });
        }

        // A self-transfer nets to zero
        if credit_document == debit_document {
            return Ok(());
        }

        credited.balance += amount;
        debited.balance -= amount;
        users.insert(credit_document.to_string(), credited);
        users.insert(debit_document.to_string(), debited);

        info!("balance transfer applied: {amount} from {debit_document} to {credit_document}");
        Ok(())
    }

    async fn credit_balance(&self, document: &str, amount: Decimal) -> Result<BootCoinUser> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(document)
            .ok_or_else(|| BootCoinError::UserNotFound {
                document: document.to_string(),
            })?;
        user.balance += amount;
        info!("balance credit applied: {amount} to {document}");
        Ok(user.clone())
    }
}
