use crate::chain::ChainClientError;
use crate::friendfi::accounts::AccountError;
use crate::friendfi::content_store::ContentStoreError;
use crate::friendfi::conversation::ProcessingError;
use crate::friendfi::database::DatabaseError;
use crate::friendfi::secrets_store::SecretsStoreError;
use crate::friendfi::signers::SignerError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, FriendFiError>;

#[derive(Error, Debug)]
pub enum FriendFiError {
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Account not found")]
    AccountNotFound,

    #[error("No wallet connected")]
    NoWalletConnected,

    #[error("Account not authorized: {0}")]
    AccountNotAuthorized(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Message rejected by content filter: {masked}")]
    MessageRejected { masked: String },

    #[error("Chain client error: {0}")]
    ChainClient(#[from] ChainClientError),

    #[error("Content store error: {0}")]
    ContentStore(#[from] ContentStoreError),

    #[error("Conversation processing error: {0}")]
    Conversation(#[from] ProcessingError),

    #[error("Query cache error: {0}")]
    Cache(String),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Secrets store error: {0}")]
    SecretsStore(#[from] SecretsStoreError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Initialization error: FriendFi instance not initialized")]
    Initialization,

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for FriendFiError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        FriendFiError::Other(anyhow::anyhow!(err.to_string()))
    }
}
