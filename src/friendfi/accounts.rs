use std::sync::Arc;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FriendFiError;
use crate::friendfi::FriendFi;
use crate::friendfi::secrets_store::SecretsStoreError;
#[cfg(feature = "insecure-local-signer")]
use crate::friendfi::signers::LocalSigner;
use crate::friendfi::signers::{self, EphemeralSigner, SignerError, SignerKind, WalletSigner};

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Secrets store error: {0}")]
    SecretsStore(#[from] SecretsStoreError),
}

/// One wallet the app has connected, persisted across sessions.
///
/// `username` caches the on-chain registration so a name is available
/// before the first contract read completes.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<i64>,
    pub address: Address,
    pub username: Option<String>,
    pub signer_kind: SignerKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Account {
    pub(crate) fn new(address: Address, signer_kind: SignerKind) -> Self {
        let now = Utc::now();
        Account {
            id: None,
            address,
            username: None,
            signer_kind,
            created_at: now,
            updated_at: now,
            last_synced_at: None,
        }
    }
}

/// The wallet occupying the single session slot.
pub(crate) struct Session {
    pub(crate) account: Account,
    pub(crate) signer: Arc<dyn WalletSigner>,
}

impl FriendFi {
    /// Connects a brand new wallet.
    ///
    /// This method generates a fresh keypair, stores the private key in the
    /// secrets store, persists the account row and makes the wallet the
    /// connected session.
    pub async fn connect_account(&self) -> Result<Account, FriendFiError> {
        let chain_id = self.chain.config().network.chain_id();
        let wallet = signers::generate_wallet(chain_id)?;
        let address = signers::wallet_address(&wallet);
        tracing::debug!(target: "friendfi::connect_account", "Generated new wallet: {:#x}", address);

        let account = self
            .persist_account_with_key(
                address,
                SignerKind::Ephemeral,
                &signers::private_key_hex(&wallet),
            )
            .await?;
        tracing::debug!(target: "friendfi::connect_account", "Key stored in secrets store and account saved to database");

        self.set_session(account.clone(), Arc::new(EphemeralSigner::from_wallet(wallet)))
            .await;
        tracing::debug!(target: "friendfi::connect_account", "Session connected: {:#x}", address);

        Ok(account)
    }

    /// Connects a wallet from a caller-supplied private key (hex, with or
    /// without a `0x` prefix).
    ///
    /// The key is persisted in the secrets store and the session signer is
    /// rebuilt from the stored copy, so a broken keyring surfaces at login
    /// rather than at the first transaction.
    #[cfg(feature = "insecure-local-signer")]
    pub async fn login_account(&self, private_key_hex: &str) -> Result<Account, FriendFiError> {
        let chain_id = self.chain.config().network.chain_id();
        let wallet = signers::wallet_from_private_key(private_key_hex, chain_id)?;
        let address = signers::wallet_address(&wallet);
        tracing::debug!(target: "friendfi::login_account", "Logging in with address: {:#x}", address);

        let account = self
            .persist_account_with_key(address, SignerKind::Local, &signers::private_key_hex(&wallet))
            .await?;
        tracing::debug!(target: "friendfi::login_account", "Key stored in secrets store and account saved to database");

        let signer = LocalSigner::from_secrets_store(&address, &self.secrets_store, chain_id)
            .map_err(AccountError::Signer)?;
        self.set_session(account.clone(), Arc::new(signer)).await;
        tracing::debug!(target: "friendfi::login_account", "Session connected: {:#x}", address);

        Ok(account)
    }

    /// Disconnects the connected wallet, if any.
    ///
    /// The account row and the stored key are kept, so the wallet can be
    /// logged back in later. Cached contract reads are dropped because they
    /// are scoped to the connected account.
    pub async fn disconnect_account(&self) -> Result<(), FriendFiError> {
        let previous = {
            let mut session = self.session.write().await;
            session.take()
        };
        match previous {
            Some(session) => {
                tracing::debug!(target: "friendfi::disconnect_account", "Disconnected: {:#x}", session.account.address);
            }
            None => {
                tracing::debug!(target: "friendfi::disconnect_account", "No session to disconnect");
            }
        }
        self.cache.clear();
        Ok(())
    }

    /// Removes a wallet from the app.
    ///
    /// This method performs the following steps:
    /// - Clears the session if the removed wallet is the connected one.
    /// - Deletes the account row from the database.
    /// - Removes the private key from the secrets store.
    pub async fn remove_account(&self, address: &Address) -> Result<(), FriendFiError> {
        let account = Account::find_by_address(address, self).await?;

        {
            let mut session = self.session.write().await;
            if session
                .as_ref()
                .is_some_and(|s| s.account.address == *address)
            {
                session.take();
                self.cache.clear();
            }
        }

        account.delete(self).await?;

        if let Err(e) = self.secrets_store.remove_private_key_for_address(address) {
            tracing::warn!(
                target: "friendfi::remove_account",
                "Failed to remove private key for {:#x}: {}",
                address,
                e
            );
            // Don't fail removal if the keyring cleanup fails
        }

        tracing::debug!(target: "friendfi::remove_account", "Removed account: {:#x}", address);
        Ok(())
    }

    /// Returns the connected account, if a session exists.
    pub async fn connected_account(&self) -> Option<Account> {
        self.session.read().await.as_ref().map(|s| s.account.clone())
    }

    /// Returns the connected wallet address, if a session exists.
    pub async fn connected_address(&self) -> Option<Address> {
        self.session.read().await.as_ref().map(|s| s.account.address)
    }

    /// Returns every wallet the app has connected, most recent first.
    pub async fn all_accounts(&self) -> Result<Vec<Account>, FriendFiError> {
        Account::all(self).await
    }

    /// The connected account and its signer, for flows that submit
    /// transactions.
    pub(crate) async fn connected_session(
        &self,
    ) -> Result<(Account, Arc<dyn WalletSigner>), FriendFiError> {
        let session = self.session.read().await;
        let session = session.as_ref().ok_or(FriendFiError::NoWalletConnected)?;
        Ok((session.account.clone(), session.signer.clone()))
    }

    async fn persist_account_with_key(
        &self,
        address: Address,
        signer_kind: SignerKind,
        private_key_hex: &str,
    ) -> Result<Account, FriendFiError> {
        self.secrets_store
            .store_private_key(&address, private_key_hex)
            .map_err(|e| {
                tracing::error!(target: "friendfi::accounts", "Failed to store private key: {}", e);
                AccountError::SecretsStore(e)
            })?;

        Account::new(address, signer_kind).save(self).await
    }

    async fn set_session(&self, account: Account, signer: Arc<dyn WalletSigner>) {
        {
            let mut session = self.session.write().await;
            *session = Some(Session { account, signer });
        }
        // Cached reads belong to the previous wallet.
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friendfi::test_utils::create_mock_friendfi;

    #[tokio::test]
    async fn test_connect_account_persists_row_and_session() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let account = friendfi.connect_account().await.unwrap();
        assert!(account.id.is_some());
        assert_eq!(account.signer_kind, SignerKind::Ephemeral);
        assert!(account.username.is_none());
        assert_eq!(friendfi.connected_address().await, Some(account.address));

        let stored = Account::find_by_address(&account.address, &friendfi)
            .await
            .unwrap();
        assert_eq!(stored.address, account.address);
        assert!(
            friendfi
                .secrets_store
                .private_key_for_address(&account.address)
                .is_ok()
        );

        friendfi.remove_account(&account.address).await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_account_replaces_existing_session() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let first = friendfi.connect_account().await.unwrap();
        let second = friendfi.connect_account().await.unwrap();
        assert_ne!(first.address, second.address);
        assert_eq!(friendfi.connected_address().await, Some(second.address));

        let accounts = friendfi.all_accounts().await.unwrap();
        assert_eq!(accounts.len(), 2);

        friendfi.remove_account(&first.address).await.unwrap();
        friendfi.remove_account(&second.address).await.unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_account_keeps_row_and_key() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let account = friendfi.connect_account().await.unwrap();
        friendfi.disconnect_account().await.unwrap();

        assert_eq!(friendfi.connected_address().await, None);
        assert!(
            Account::find_by_address(&account.address, &friendfi)
                .await
                .is_ok()
        );
        assert!(
            friendfi
                .secrets_store
                .private_key_for_address(&account.address)
                .is_ok()
        );

        friendfi.remove_account(&account.address).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_account_deletes_row_and_key() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let account = friendfi.connect_account().await.unwrap();
        friendfi.remove_account(&account.address).await.unwrap();

        assert_eq!(friendfi.connected_address().await, None);
        assert!(matches!(
            Account::find_by_address(&account.address, &friendfi).await,
            Err(FriendFiError::AccountNotFound)
        ));
        assert!(
            friendfi
                .secrets_store
                .private_key_for_address(&account.address)
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_remove_account_unknown_address() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let result = friendfi.remove_account(&Address::repeat_byte(0x77)).await;
        assert!(matches!(result, Err(FriendFiError::AccountNotFound)));
    }

    #[tokio::test]
    async fn test_connected_session_requires_connection() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let result = friendfi.connected_session().await;
        assert!(matches!(result, Err(FriendFiError::NoWalletConnected)));
    }

    #[cfg(feature = "insecure-local-signer")]
    #[tokio::test]
    async fn test_login_account_imports_key() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let wallet = signers::generate_wallet(4157).unwrap();
        let expected = signers::wallet_address(&wallet);

        let account = friendfi
            .login_account(&signers::private_key_hex(&wallet))
            .await
            .unwrap();
        assert_eq!(account.address, expected);
        assert_eq!(account.signer_kind, SignerKind::Local);
        assert_eq!(friendfi.connected_address().await, Some(expected));

        let (_, signer) = friendfi.connected_session().await.unwrap();
        assert_eq!(signer.address(), expected);

        friendfi.remove_account(&expected).await.unwrap();
    }

    #[cfg(feature = "insecure-local-signer")]
    #[tokio::test]
    async fn test_login_account_rejects_bad_key() {
        let (friendfi, _data_temp, _logs_temp) = create_mock_friendfi().await;

        let result = friendfi.login_account("not-a-key").await;
        assert!(matches!(result, Err(FriendFiError::Signer(_))));
        assert_eq!(friendfi.connected_address().await, None);
    }
}
