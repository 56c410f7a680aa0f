//! Local signer using a key stored in the secrets store.
//!
//! **WARNING**: This signer keeps raw private keys on the device, which is
//! inherently less secure than an external wallet. This module is only
//! available when the `insecure-local-signer` feature is enabled.

use alloy_primitives::Address;
use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;

use super::error::SignerError;
use super::{WalletSigner, wallet_address, wallet_from_private_key};
use crate::friendfi::secrets_store::SecretsStore;

/// A signer that loads its key from the keyring via `SecretsStore`.
///
/// **WARNING**: This keeps raw private keys on the device, which is
/// inherently less secure than an external wallet. Only use this for
/// development, testing, or when no external wallet is available.
#[derive(Debug)]
pub struct LocalSigner {
    wallet: LocalWallet,
}

impl LocalSigner {
    /// Create a new LocalSigner by retrieving the key for `address` from
    /// the secrets store.
    ///
    /// # Errors
    ///
    /// Returns `SignerError::KeyNotFound` if no key is stored for the given
    /// address.
    pub fn from_secrets_store(
        address: &Address,
        secrets_store: &SecretsStore,
        chain_id: u64,
    ) -> Result<Self, SignerError> {
        let key_hex = secrets_store
            .private_key_for_address(address)
            .map_err(|_| SignerError::KeyNotFound(*address))?;
        let wallet = wallet_from_private_key(&key_hex, chain_id)?;
        Ok(Self { wallet })
    }

    /// Create a new LocalSigner from a private key in hex.
    ///
    /// Note: This does not persist the key. Use
    /// `SecretsStore::store_private_key` to persist it.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> Result<Self, SignerError> {
        Ok(Self {
            wallet: wallet_from_private_key(private_key_hex, chain_id)?,
        })
    }
}

#[async_trait]
impl WalletSigner for LocalSigner {
    fn address(&self) -> Address {
        wallet_address(&self.wallet)
    }

    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Vec<u8>, SignerError> {
        let signature = self.wallet.sign_transaction(tx).await?;
        Ok(tx.rlp_signed(&signature).to_vec())
    }
}
