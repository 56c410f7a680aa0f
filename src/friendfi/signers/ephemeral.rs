//! Ephemeral in-memory signer.
//!
//! This signer holds its wallet in memory only and does not persist it.
//! Useful for unit tests, integration tests, and throwaway sessions.

use alloy_primitives::Address;
use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;

use super::error::SignerError;
use super::{WalletSigner, wallet_address};

/// An in-memory signer that does not persist its key.
///
/// This signer is useful when signing capability is needed without any key
/// reaching disk or the keyring. A fresh connect wraps its generated wallet
/// in this type; persistence of the key is handled separately.
///
/// # Example
///
/// ```ignore
/// let signer = EphemeralSigner::generate(4157)?;
/// let address = signer.address();
/// ```
#[derive(Debug, Clone)]
pub struct EphemeralSigner {
    wallet: LocalWallet,
}

impl EphemeralSigner {
    /// Generate a new ephemeral signer with a random key bound to the given
    /// chain id.
    pub fn generate(chain_id: u64) -> Result<Self, SignerError> {
        Ok(Self {
            wallet: super::generate_wallet(chain_id)?,
        })
    }

    /// Create an ephemeral signer from an existing wallet.
    ///
    /// Note: The wallet keeps whatever chain id it was built with.
    pub fn from_wallet(wallet: LocalWallet) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl WalletSigner for EphemeralSigner {
    fn address(&self) -> Address {
        wallet_address(&self.wallet)
    }

    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Vec<u8>, SignerError> {
        let signature = self.wallet.sign_transaction(tx).await?;
        Ok(tx.rlp_signed(&signature).to_vec())
    }
}
