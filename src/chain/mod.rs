use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use alloy_primitives::{Address, U256};
use serde_json::{json, Value};
use thiserror::Error;

pub mod abi;
pub mod publisher;
pub mod query;

/// Address of the chat contract on the CrossFi testnet.
pub const TESTNET_CONTRACT_ADDRESS: &str = "0xEfa1D9CdC8021096985f8be3935e3cEbC302a98f";

#[derive(Error, Debug)]
pub enum ChainClientError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),
    #[error("ABI decoding failed: {0}")]
    Decode(String),
    #[error("Invalid hex in response: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("No contract address configured for {0}")]
    MissingContractAddress(ChainNetwork),
    #[error("Connected node reports chain id {actual}, expected {expected}")]
    ChainIdMismatch { expected: u64, actual: u64 },
    #[error("Transaction signing failed: {0}")]
    Signing(String),
    #[error("Transaction reverted: {0}")]
    Reverted(String),
    #[error("Timed out waiting for receipt of {0}")]
    ReceiptTimeout(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChainClientError>;

/// The CrossFi networks the chat contract is deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainNetwork {
    Testnet,
    Mainnet,
}

impl ChainNetwork {
    pub fn chain_id(&self) -> u64 {
        match self {
            ChainNetwork::Testnet => 4157,
            ChainNetwork::Mainnet => 4158,
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            ChainNetwork::Testnet => "https://rpc.testnet.ms",
            ChainNetwork::Mainnet => "https://rpc.mainnet.ms",
        }
    }

    /// No public mainnet deployment exists yet, so mainnet requires an
    /// explicit contract address from config.
    pub fn default_contract_address(&self) -> Option<&'static str> {
        match self {
            ChainNetwork::Testnet => Some(TESTNET_CONTRACT_ADDRESS),
            ChainNetwork::Mainnet => None,
        }
    }

    pub fn explorer_url(&self) -> &'static str {
        match self {
            ChainNetwork::Testnet => "https://test.xfiscan.com",
            ChainNetwork::Mainnet => "https://xfiscan.com",
        }
    }
}

impl fmt::Display for ChainNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainNetwork::Testnet => write!(f, "CrossFi testnet"),
            ChainNetwork::Mainnet => write!(f, "CrossFi mainnet"),
        }
    }
}

/// Resolved connection parameters for one network.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub network: ChainNetwork,
    pub rpc_url: String,
    pub contract_address: Address,
}

impl ChainConfig {
    /// Resolve the effective RPC endpoint and contract address, applying
    /// overrides on top of the network defaults.
    pub fn resolve(
        network: ChainNetwork,
        rpc_url_override: Option<&str>,
        contract_address_override: Option<&str>,
    ) -> Result<Self> {
        let rpc_url = rpc_url_override
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| network.default_rpc_url())
            .trim_end_matches('/')
            .to_string();

        let contract_str = contract_address_override
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .or_else(|| network.default_contract_address())
            .ok_or(ChainClientError::MissingContractAddress(network))?;
        let contract_address = contract_str
            .parse::<Address>()
            .map_err(|e| ChainClientError::InvalidAddress(format!("{contract_str}: {e}")))?;

        Ok(ChainConfig {
            network,
            rpc_url,
            contract_address,
        })
    }
}

/// JSON-RPC boundary to the chat contract.
///
/// Read methods encode typed calldata, post it via `eth_call` and decode the
/// returned bytes with the generated decoders; anything the node sends back
/// that doesn't match the declared schema is an error, never a silent
/// default. Writes go through [`publisher`].
#[derive(Debug, Clone)]
pub struct ChainClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ChainConfig,
    request_id: Arc<AtomicU64>,
}

impl ChainClient {
    /// Default timeout for RPC requests
    pub(crate) fn default_timeout() -> Duration {
        Duration::from_secs(20)
    }

    pub fn new(config: ChainConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ChainClient {
            http,
            config,
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn contract_address(&self) -> Address {
        self.config.contract_address
    }

    pub fn explorer_transaction_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.config.network.explorer_url(), tx_hash)
    }

    /// Perform a single JSON-RPC request and extract the `result` field.
    pub(crate) async fn rpc(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::trace!(
            target: "friendfi::chain",
            "rpc request {} -> {}",
            method,
            self.config.rpc_url
        );

        let response = self
            .http
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let envelope: Value = response.json().await?;

        if let Some(error) = envelope.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error")
                .to_string();
            return Err(ChainClientError::Rpc { code, message });
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| ChainClientError::MalformedResponse(format!("{method}: missing result")))
    }

    /// `eth_call` against the chat contract with pre-encoded calldata.
    pub(crate) async fn eth_call(&self, calldata: Vec<u8>) -> Result<Vec<u8>> {
        let params = json!([
            {
                "to": format!("{:#x}", self.config.contract_address),
                "data": format!("0x{}", hex::encode(calldata)),
            },
            "latest",
        ]);
        let result = self.rpc("eth_call", params).await?;
        decode_hex_bytes(&result, "eth_call")
    }

    /// Assert the node's chain id matches the configured network. Run once
    /// in the background at startup; a mismatch is logged, not fatal.
    pub async fn verify_network(&self) -> Result<()> {
        let result = self.rpc("eth_chainId", json!([])).await?;
        let actual = quantity_to_u64(&result, "eth_chainId")?;
        let expected = self.config.network.chain_id();
        if actual != expected {
            return Err(ChainClientError::ChainIdMismatch { expected, actual });
        }
        tracing::debug!(
            target: "friendfi::chain",
            "connected to {} (chain id {})",
            self.config.network,
            actual
        );
        Ok(())
    }
}

/// Decode a `0x`-prefixed hex string result into raw bytes.
pub(crate) fn decode_hex_bytes(value: &Value, context: &str) -> Result<Vec<u8>> {
    let text = value
        .as_str()
        .ok_or_else(|| ChainClientError::MalformedResponse(format!("{context}: non-string result")))?;
    let stripped = text.strip_prefix("0x").unwrap_or(text);
    Ok(hex::decode(stripped)?)
}

/// Decode a `0x`-prefixed hex quantity into a `u64`.
pub(crate) fn quantity_to_u64(value: &Value, context: &str) -> Result<u64> {
    let text = value
        .as_str()
        .ok_or_else(|| ChainClientError::MalformedResponse(format!("{context}: non-string result")))?;
    let stripped = text.strip_prefix("0x").unwrap_or(text);
    u64::from_str_radix(stripped, 16)
        .map_err(|e| ChainClientError::MalformedResponse(format!("{context}: {e}")))
}

/// Decode a `0x`-prefixed hex quantity into a `U256` (balances, fees).
pub(crate) fn quantity_to_u256(value: &Value, context: &str) -> Result<U256> {
    let text = value
        .as_str()
        .ok_or_else(|| ChainClientError::MalformedResponse(format!("{context}: non-string result")))?;
    let stripped = text.strip_prefix("0x").unwrap_or(text);
    U256::from_str_radix(stripped, 16)
        .map_err(|e| ChainClientError::MalformedResponse(format!("{context}: {e}")))
}
