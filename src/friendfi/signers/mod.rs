//! Signer abstraction layer for FriendFi.
//!
//! This module provides a unified interface over the backends that can hold
//! a wallet key and sign contract transactions:
//! - `EphemeralSigner`: In-memory wallet, used for fresh connects and tests
//! - `LocalSigner`: Wallet loaded from the OS keyring (feature-gated, insecure)
//!
//! # Feature Flags
//!
//! - `insecure-local-signer`: Enables the keyring-backed signer and raw
//!   private key import. This is disabled by default because it keeps raw
//!   private keys on the device.

pub mod ephemeral;
pub mod error;

#[cfg(feature = "insecure-local-signer")]
pub mod local;

// Re-exports
pub use ephemeral::EphemeralSigner;
pub use error::SignerError;

#[cfg(feature = "insecure-local-signer")]
pub use local::LocalSigner;

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use serde::{Deserialize, Serialize};

/// Common interface for transaction signing backends.
///
/// The chain publisher builds transactions and hands them to this trait for
/// signing. Implementations hold a key already bound to the configured
/// chain id; signing a transaction built for a different chain fails.
#[async_trait]
pub trait WalletSigner: fmt::Debug + Send + Sync {
    /// Address whose key backs this signer.
    fn address(&self) -> Address;

    /// Sign a fully-populated transaction and return the raw RLP-encoded
    /// bytes ready for `eth_sendRawTransaction`.
    async fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Vec<u8>, SignerError>;
}

/// Represents the backend that produced and holds the signing key for an
/// account.
///
/// The kind is stored alongside the account row to remember how each wallet
/// was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignerKind {
    /// Generated in-process on connect. The key also lands in the keyring
    /// so that feature-enabled builds can log the wallet back in.
    Ephemeral,

    /// Imported from caller-supplied hex.
    ///
    /// Only produced with the `insecure-local-signer` feature enabled.
    Local,
}

impl fmt::Display for SignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerKind::Ephemeral => write!(f, "ephemeral"),
            SignerKind::Local => write!(f, "local"),
        }
    }
}

impl FromStr for SignerKind {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ephemeral" => Ok(SignerKind::Ephemeral),
            "local" => Ok(SignerKind::Local),
            other => Err(SignerError::UnknownKind(other.to_string())),
        }
    }
}

/// Generates a fresh random wallet bound to the given chain id.
pub(crate) fn generate_wallet(chain_id: u64) -> Result<LocalWallet, SignerError> {
    let secret: [u8; 32] = rand::random();
    let wallet = LocalWallet::from_bytes(&secret)?;
    Ok(wallet.with_chain_id(chain_id))
}

/// Builds a wallet from a 32-byte private key in hex, with or without
/// a `0x` prefix.
pub(crate) fn wallet_from_private_key(
    private_key_hex: &str,
    chain_id: u64,
) -> Result<LocalWallet, SignerError> {
    let trimmed = private_key_hex.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(stripped).map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(SignerError::InvalidPrivateKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    let wallet = LocalWallet::from_bytes(&bytes)?;
    Ok(wallet.with_chain_id(chain_id))
}

/// Serializes a wallet's private key as unprefixed hex for keyring storage.
pub(crate) fn private_key_hex(wallet: &LocalWallet) -> String {
    hex::encode(wallet.signer().to_bytes())
}

pub(crate) fn wallet_address(wallet: &LocalWallet) -> Address {
    Address::from_slice(wallet.address().as_bytes())
}
