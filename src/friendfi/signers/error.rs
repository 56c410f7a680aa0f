//! Signer error types for the wallet signer abstraction layer.

use alloy_primitives::Address;
use thiserror::Error;

/// Errors that can occur while building or using a wallet signer.
#[derive(Error, Debug)]
pub enum SignerError {
    /// The supplied private key hex could not be decoded into a key.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A persisted signer kind string did not match any known backend.
    #[error("Unknown signer kind: {0}")]
    UnknownKind(String),

    /// No signing key is stored for the given address.
    #[error("Key not found for address: {0}")]
    KeyNotFound(Address),

    /// Error from the underlying wallet implementation.
    #[error("Wallet error: {0}")]
    Wallet(#[from] ethers::signers::WalletError),
}
