//! Bootcoin Users - Registration and rail association
//!
//! Associating a rail requires the owning system to confirm the identifier
//! actually exists for that customer. The confirmation travels over the
//! messaging transport, so these flows publish a validation request and
//! suspend on the correlation bridge until the answer arrives.

use std::sync::Arc;

use bootcoin_correlation::CorrelationBridge;
use bootcoin_messaging::topics;
use bootcoin_store::UserDirectory;
use bootcoin_types::{BootCoinError, BootCoinUser, Result, ValidationRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Enrollment request, optionally associating rails up front
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub document_number: String,
    pub phone_number: String,
    pub email: String,
    pub associate_wallet: bool,
    pub bank_account_id: Option<String>,
}

/// Result of an enrollment or association flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub document_number: String,
    pub wallet_enabled: bool,
    pub bank_account_id: Option<String>,
}

impl From<&BootCoinUser> for UserView {
    fn from(user: &BootCoinUser) -> Self {
        Self {
            document_number: user.document_number.clone(),
            wallet_enabled: user.wallet_enabled,
            bank_account_id: user.bank_account_id.clone(),
        }
    }
}

/// Enrollment and rail association over the validation bridge
pub struct UserService {
    users: Arc<dyn UserDirectory>,
    bridge: Arc<CorrelationBridge>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>, bridge: Arc<CorrelationBridge>) -> Self {
        Self { users, bridge }
    }

    /// Enroll a new user with a zero balance
    ///
    /// Each requested association is confirmed through the bridge; a
    /// rejection or timeout propagates after the user record is saved,
    /// leaving enrollment itself in place.
    pub async fn register_user(&self, request: RegistrationRequest) -> Result<UserView> {
        let mut user = BootCoinUser::new(
            request.document_number,
            request.phone_number,
            request.email,
        );
        user.wallet_enabled = request.associate_wallet;
        user.bank_account_id = request.bank_account_id;
        let user = self.users.save(user).await?;
        info!("user {} enrolled", user.document_number);

        if user.wallet_enabled {
            self.bridge
                .send_and_await(
                    topics::WALLET_ASSOCIATION,
                    ValidationRequest::wallet(&user.document_number, &user.phone_number),
                )
                .await?;
        }
        if let Some(account) = &user.bank_account_id {
            self.bridge
                .send_and_await(
                    topics::BANK_ACCOUNT_ASSOCIATION,
                    ValidationRequest::bank_account(&user.document_number, account),
                )
                .await?;
        }

        Ok(UserView::from(&user))
    }

    /// Enable the wallet rail for an existing user
    pub async fn associate_wallet(&self, document: &str) -> Result<UserView> {
        let mut user = self
            .users
            .find_by_document(document)
            .await?
            .ok_or_else(|| BootCoinError::UserNotFound {
                document: document.to_string(),
            })?;
        if user.wallet_enabled {
            return Err(BootCoinError::WalletAlreadyAssociated {
                document: document.to_string(),
            });
        }

        self.bridge
            .send_and_await(
                topics::WALLET_ASSOCIATION,
                ValidationRequest::wallet(&user.document_number, &user.phone_number),
            )
            .await?;

        user.wallet_enabled = true;
        let user = self.users.save(user).await?;
        info!("wallet rail enabled for {}", user.document_number);
        Ok(UserView::from(&user))
    }

    /// Link a bank-transfer account to an existing user
    pub async fn associate_bank_account(&self, document: &str, account: &str) -> Result<UserView> {
        let mut user = self
            .users
            .find_by_document(document)
            .await?
            .ok_or_else(|| BootCoinError::UserNotFound {
                document: document.to_string(),
            })?;
        if user.bank_account_id.is_some() {
            return Err(BootCoinError::AccountAlreadyAssociated {
                document: document.to_string(),
            });
        }

        self.bridge
            .send_and_await(
                topics::BANK_ACCOUNT_ASSOCIATION,
                ValidationRequest::bank_account(&user.document_number, account),
            )
            .await?;

        user.bank_account_id = Some(account.to_string());
        let user = self.users.save(user).await?;
        info!("bank account linked for {}", user.document_number);
        Ok(UserView::from(&user))
    }

    /// Whether a user exists with this phone and document pair
    pub async fn validate_user(&self, phone: &str, document: &str) -> Result<bool> {
        Ok(self
            .users
            .find_by_phone_and_document(phone, document)
            .await?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootcoin_messaging::InMemoryBus;
    use bootcoin_store::InMemoryUserDirectory;
    use bootcoin_types::ValidationResponse;
    use std::time::Duration;

    struct Fixture {
        service: UserService,
        users: Arc<InMemoryUserDirectory>,
        bridge: Arc<CorrelationBridge>,
        bus: Arc<InMemoryBus>,
    }

    fn fixture(timeout: Duration) -> Fixture {
        let users = Arc::new(InMemoryUserDirectory::new());
        let bus = Arc::new(InMemoryBus::new());
        let bridge = Arc::new(CorrelationBridge::new(bus.clone(), timeout));
        let service = UserService::new(users.clone(), bridge.clone());
        Fixture {
            service,
            users,
            bridge,
            bus,
        }
    }

    /// Answer every validation request on the bus with the given outcome,
    /// standing in for the external rail systems.
    fn spawn_responder(fx: &Fixture, success: bool, error_message: Option<&str>) {
        let mut rx = fx.bus.subscribe();
        let bridge = fx.bridge.clone();
        let error_message = error_message.map(str::to_string);
        tokio::spawn(async move {
            while let Ok(message) = rx.recv().await {
                if message.topic != topics::WALLET_ASSOCIATION
                    && message.topic != topics::BANK_ACCOUNT_ASSOCIATION
                {
                    continue;
                }
                let request: ValidationRequest =
                    serde_json::from_value(message.payload).unwrap();
                bridge.resolve(ValidationResponse {
                    correlation_id: request.correlation_id,
                    success,
                    error_message: error_message.clone(),
                });
            }
        });
    }

    fn registration(wallet: bool, account: Option<&str>) -> RegistrationRequest {
        RegistrationRequest {
            document_number: "44556677".to_string(),
            phone_number: "999111222".to_string(),
            email: "customer@mail.pe".to_string(),
            associate_wallet: wallet,
            bank_account_id: account.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn registration_without_associations_skips_the_bridge() {
        let fx = fixture(Duration::from_millis(50));

        let view = fx.service.register_user(registration(false, None)).await.unwrap();
        assert!(!view.wallet_enabled);
        assert!(view.bank_account_id.is_none());
        assert!(fx.bus.published().await.is_empty());
    }

    #[tokio::test]
    async fn registration_validates_each_requested_association() {
        let fx = fixture(Duration::from_secs(5));
        spawn_responder(&fx, true, None);

        let view = fx
            .service
            .register_user(registration(true, Some("191-555")))
            .await
            .unwrap();
        assert!(view.wallet_enabled);
        assert_eq!(view.bank_account_id.as_deref(), Some("191-555"));

        assert_eq!(fx.bus.published_on(topics::WALLET_ASSOCIATION).await.len(), 1);
        assert_eq!(
            fx.bus
                .published_on(topics::BANK_ACCOUNT_ASSOCIATION)
                .await
                .len(),
            1
        );
        assert_eq!(fx.bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn wallet_association_flips_the_flag_after_validation() {
        let fx = fixture(Duration::from_secs(5));
        spawn_responder(&fx, true, None);
        fx.users
            .insert(BootCoinUser::new("44556677", "999111222", "customer@mail.pe"))
            .await;

        let view = fx.service.associate_wallet("44556677").await.unwrap();
        assert!(view.wallet_enabled);

        let again = fx.service.associate_wallet("44556677").await;
        assert!(matches!(
            again,
            Err(BootCoinError::WalletAlreadyAssociated { .. })
        ));
    }

    #[tokio::test]
    async fn rejected_validation_leaves_the_user_unchanged() {
        let fx = fixture(Duration::from_secs(5));
        spawn_responder(&fx, false, Some("phone is not a wallet account"));
        fx.users
            .insert(BootCoinUser::new("44556677", "999111222", "customer@mail.pe"))
            .await;

        let result = fx.service.associate_wallet("44556677").await;
        match result {
            Err(BootCoinError::ValidationRejected { reason }) => {
                assert_eq!(reason, "phone is not a wallet account");
            }
            other => panic!("expected ValidationRejected, got {other:?}"),
        }

        let user = fx.users.find_by_document("44556677").await.unwrap().unwrap();
        assert!(!user.wallet_enabled);
    }

    #[tokio::test]
    async fn unanswered_validation_times_out() {
        let fx = fixture(Duration::from_millis(20));
        fx.users
            .insert(BootCoinUser::new("44556677", "999111222", "customer@mail.pe"))
            .await;

        let result = fx.service.associate_bank_account("44556677", "191-555").await;
        assert!(matches!(
            result,
            Err(BootCoinError::CorrelationTimeout { .. })
        ));
        let user = fx.users.find_by_document("44556677").await.unwrap().unwrap();
        assert!(user.bank_account_id.is_none());
    }

    #[tokio::test]
    async fn account_association_requires_a_free_slot() {
        let fx = fixture(Duration::from_secs(5));
        spawn_responder(&fx, true, None);
        let mut user = BootCoinUser::new("44556677", "999111222", "customer@mail.pe");
        user.bank_account_id = Some("191-000".into());
        fx.users.insert(user).await;

        let result = fx.service.associate_bank_account("44556677", "191-555").await;
        assert!(matches!(
            result,
            Err(BootCoinError::AccountAlreadyAssociated { .. })
        ));
    }

    #[tokio::test]
    async fn validate_user_checks_the_pair() {
        let fx = fixture(Duration::from_millis(50));
        fx.users
            .insert(BootCoinUser::new("44556677", "999111222", "customer@mail.pe"))
            .await;

        assert!(fx.service.validate_user("999111222", "44556677").await.unwrap());
        assert!(!fx.service.validate_user("900000000", "44556677").await.unwrap());
        assert!(!fx.service.validate_user("999111222", "00000000").await.unwrap());
    }
}
