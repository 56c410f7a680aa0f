use std::time::{Duration, Instant};

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use ethers::types::{
    transaction::eip2718::TypedTransaction, Address as EthersAddress, Bytes,
    Eip1559TransactionRequest, U256 as EthersU256,
};
use serde_json::{json, Value};

use super::{abi, quantity_to_u256, quantity_to_u64, ChainClient, ChainClientError, Result};
use crate::friendfi::signers::WalletSigner;

const MIN_PRIORITY_FEE_PER_GAS: u64 = 1_000_000;
const GAS_LIMIT_BUFFER: u64 = 250_000;
const RECEIPT_POLL_TIMEOUT_SECS: u64 = 45;
const RECEIPT_POLL_INTERVAL_MS: u64 = 1_250;

/// Outcome of a mined transaction.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    pub explorer_url: String,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SuggestedFees {
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
}

impl ChainClient {
    /// Build, sign and submit an EIP-1559 transaction to the chat contract,
    /// then poll until it is mined. A receipt with status 0 is an error.
    ///
    /// The signer's key must be bound to the configured chain; the signer
    /// rejects the transaction otherwise.
    pub async fn submit_transaction(
        &self,
        signer: &dyn WalletSigner,
        calldata: Vec<u8>,
        value: U256,
    ) -> Result<TransactionOutcome> {
        let chain_id = self.config.network.chain_id();
        let from = signer.address();
        let to = EthersAddress::from_slice(self.config.contract_address.as_slice());

        let nonce_result = self
            .rpc(
                "eth_getTransactionCount",
                json!([format!("{from:#x}"), "pending"]),
            )
            .await?;
        let nonce = quantity_to_u64(&nonce_result, "eth_getTransactionCount")?;

        let fees = self.suggested_fees().await?;
        let gas_limit = self.estimate_gas(from, value, &calldata).await?;

        tracing::debug!(
            target: "friendfi::chain::publisher",
            "tx params: nonce={} gasLimit={} maxFeePerGas={} maxPriorityFeePerGas={}",
            nonce,
            gas_limit,
            fees.max_fee_per_gas,
            fees.max_priority_fee_per_gas
        );

        let request = Eip1559TransactionRequest::new()
            .from(EthersAddress::from_slice(from.as_slice()))
            .to(to)
            .data(Bytes::from(calldata))
            .value(to_ethers_u256(value))
            .nonce(EthersU256::from(nonce))
            .chain_id(chain_id)
            .max_fee_per_gas(to_ethers_u256(fees.max_fee_per_gas))
            .max_priority_fee_per_gas(to_ethers_u256(fees.max_priority_fee_per_gas))
            .gas(to_ethers_u256(gas_limit));
        let typed_tx: TypedTransaction = request.into();

        let raw = signer
            .sign_transaction(&typed_tx)
            .await
            .map_err(|e| ChainClientError::Signing(e.to_string()))?;

        let submitted = self
            .rpc(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(&raw))]),
            )
            .await?;
        let tx_hash = submitted
            .as_str()
            .ok_or_else(|| {
                ChainClientError::MalformedResponse(
                    "eth_sendRawTransaction: non-string result".to_string(),
                )
            })?
            .to_string();

        tracing::info!(
            target: "friendfi::chain::publisher",
            "submitted transaction {}",
            tx_hash
        );

        self.await_transaction_receipt(&tx_hash).await
    }

    /// Fee suggestion derived from `eth_gasPrice`, with a floor on the
    /// priority fee and headroom on the max fee.
    pub(crate) async fn suggested_fees(&self) -> Result<SuggestedFees> {
        let result = self.rpc("eth_gasPrice", json!([])).await?;
        let gas_price = quantity_to_u256(&result, "eth_gasPrice")?;
        let priority_floor = U256::from(MIN_PRIORITY_FEE_PER_GAS);
        let priority = std::cmp::max(gas_price / U256::from(5u64), priority_floor);
        let buffered = gas_price * U256::from(4u64);
        let min_required = gas_price + priority;
        Ok(SuggestedFees {
            max_priority_fee_per_gas: priority,
            max_fee_per_gas: std::cmp::max(buffered, min_required),
        })
    }

    /// `eth_estimateGas` plus a fixed buffer. Estimation failures propagate:
    /// the node error carries the revert reason for a doomed transaction.
    async fn estimate_gas(&self, from: Address, value: U256, calldata: &[u8]) -> Result<U256> {
        let params = json!([{
            "from": format!("{from:#x}"),
            "to": format!("{:#x}", self.config.contract_address),
            "data": format!("0x{}", hex::encode(calldata)),
            "value": format!("{value:#x}"),
        }]);
        let result = self.rpc("eth_estimateGas", params).await?;
        let estimated = quantity_to_u256(&result, "eth_estimateGas")?;
        Ok(estimated + U256::from(GAS_LIMIT_BUFFER))
    }

    async fn await_transaction_receipt(&self, tx_hash: &str) -> Result<TransactionOutcome> {
        let started_at = Instant::now();
        let timeout = Duration::from_secs(RECEIPT_POLL_TIMEOUT_SECS);
        let mut logged_transient_error = false;

        loop {
            match self.rpc("eth_getTransactionReceipt", json!([tx_hash])).await {
                Ok(result) if !result.is_null() => {
                    let status = result.get("status").and_then(Value::as_str);
                    if status.is_some_and(|s| s.eq_ignore_ascii_case("0x0")) {
                        return Err(ChainClientError::Reverted(tx_hash.to_string()));
                    }
                    return Ok(TransactionOutcome {
                        tx_hash: tx_hash.to_string(),
                        block_number: receipt_quantity(&result, "blockNumber"),
                        gas_used: receipt_quantity(&result, "gasUsed"),
                        explorer_url: self.explorer_transaction_url(tx_hash),
                    });
                }
                Ok(_) => {}
                Err(err) => {
                    if !logged_transient_error {
                        tracing::warn!(
                            target: "friendfi::chain::publisher",
                            "receipt poll transient error for {}: {}",
                            tx_hash,
                            err
                        );
                        logged_transient_error = true;
                    }
                    if started_at.elapsed() >= timeout {
                        return Err(err);
                    }
                }
            }
            if started_at.elapsed() >= timeout {
                return Err(ChainClientError::ReceiptTimeout(tx_hash.to_string()));
            }
            tokio::time::sleep(Duration::from_millis(RECEIPT_POLL_INTERVAL_MS)).await;
        }
    }

    // Typed write surface

    pub async fn stake(&self, signer: &dyn WalletSigner, amount: U256) -> Result<TransactionOutcome> {
        let calldata = abi::stakeCall {}.abi_encode();
        self.submit_transaction(signer, calldata, amount).await
    }

    pub async fn unstake(&self, signer: &dyn WalletSigner) -> Result<TransactionOutcome> {
        let calldata = abi::unstakeCall {}.abi_encode();
        self.submit_transaction(signer, calldata, U256::ZERO).await
    }

    pub async fn set_username(
        &self,
        signer: &dyn WalletSigner,
        username: String,
    ) -> Result<TransactionOutcome> {
        let calldata = abi::setUsernameCall { username }.abi_encode();
        self.submit_transaction(signer, calldata, U256::ZERO).await
    }

    pub async fn send_message(
        &self,
        signer: &dyn WalletSigner,
        receiver: Address,
        content_pointer: String,
        is_encrypted: bool,
    ) -> Result<TransactionOutcome> {
        let calldata = abi::sendMessageCall {
            receiver,
            contentIPFSHash: content_pointer,
            isEncrypted: is_encrypted,
        }
        .abi_encode();
        self.submit_transaction(signer, calldata, U256::ZERO).await
    }

    pub async fn send_message_with_tip(
        &self,
        signer: &dyn WalletSigner,
        receiver: Address,
        content_pointer: String,
        is_encrypted: bool,
        tip_amount: U256,
    ) -> Result<TransactionOutcome> {
        let calldata = abi::sendMessageWithTipCall {
            receiver,
            contentIPFSHash: content_pointer,
            isEncrypted: is_encrypted,
        }
        .abi_encode();
        self.submit_transaction(signer, calldata, tip_amount).await
    }

    pub async fn claim_rewards(&self, signer: &dyn WalletSigner) -> Result<TransactionOutcome> {
        let calldata = abi::claimRewardsCall {}.abi_encode();
        self.submit_transaction(signer, calldata, U256::ZERO).await
    }

    pub async fn set_min_stake_amount(
        &self,
        signer: &dyn WalletSigner,
        new_amount: U256,
    ) -> Result<TransactionOutcome> {
        let calldata = abi::setMinStakeAmountCall { newAmount: new_amount }.abi_encode();
        self.submit_transaction(signer, calldata, U256::ZERO).await
    }

    pub async fn set_reward_rate(
        &self,
        signer: &dyn WalletSigner,
        new_rate: U256,
    ) -> Result<TransactionOutcome> {
        let calldata = abi::setRewardRateCall { newRate: new_rate }.abi_encode();
        self.submit_transaction(signer, calldata, U256::ZERO).await
    }

    pub async fn set_reward_interval(
        &self,
        signer: &dyn WalletSigner,
        new_interval_seconds: u64,
    ) -> Result<TransactionOutcome> {
        let calldata = abi::setRewardIntervalCall {
            newInterval: U256::from(new_interval_seconds),
        }
        .abi_encode();
        self.submit_transaction(signer, calldata, U256::ZERO).await
    }

    pub async fn withdraw_tokens(
        &self,
        signer: &dyn WalletSigner,
        token_address: Address,
        amount: U256,
    ) -> Result<TransactionOutcome> {
        let calldata = abi::withdrawTokensCall {
            tokenAddress: token_address,
            amount,
        }
        .abi_encode();
        self.submit_transaction(signer, calldata, U256::ZERO).await
    }
}

fn to_ethers_u256(value: U256) -> EthersU256 {
    EthersU256::from_big_endian(&value.to_be_bytes::<32>())
}

fn receipt_quantity(receipt: &Value, field: &str) -> Option<u64> {
    receipt
        .get(field)
        .and_then(Value::as_str)
        .and_then(|text| u64::from_str_radix(text.trim_start_matches("0x"), 16).ok())
}

#[cfg(test)]
mod tests {
    use ethers::signers::{LocalWallet, Signer};
    use mockito::Matcher;

    use super::*;
    use crate::chain::{ChainConfig, ChainNetwork};
    use crate::friendfi::signers::EphemeralSigner;

    fn test_client(rpc_url: &str) -> ChainClient {
        let config = ChainConfig::resolve(ChainNetwork::Testnet, Some(rpc_url), None)
            .expect("testnet config should resolve");
        ChainClient::new(config, ChainClient::default_timeout()).expect("client should build")
    }

    fn test_signer() -> EphemeralSigner {
        let wallet = LocalWallet::from_bytes(&[0x42u8; 32])
            .expect("fixed test key should parse")
            .with_chain_id(4157u64);
        EphemeralSigner::from_wallet(wallet)
    }

    async fn mock_method(
        server: &mut mockito::ServerGuard,
        method: &str,
        result: &str,
    ) -> mockito::Mock {
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJsonString(format!(
                r#"{{"method":"{method}"}}"#
            )))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"jsonrpc":"2.0","id":1,"result":{result}}}"#))
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_submit_transaction_happy_path() {
        let mut server = mockito::Server::new_async().await;
        let _nonce = mock_method(&mut server, "eth_getTransactionCount", r#""0x7""#).await;
        let _gas_price = mock_method(&mut server, "eth_gasPrice", r#""0x3b9aca00""#).await;
        let _estimate = mock_method(&mut server, "eth_estimateGas", r#""0x5208""#).await;
        let _send = mock_method(
            &mut server,
            "eth_sendRawTransaction",
            r#""0xabc0000000000000000000000000000000000000000000000000000000000123""#,
        )
        .await;
        let _receipt = mock_method(
            &mut server,
            "eth_getTransactionReceipt",
            r#"{"status":"0x1","blockNumber":"0xa","gasUsed":"0x5208"}"#,
        )
        .await;

        let client = test_client(&server.url());
        let outcome = client
            .submit_transaction(&test_signer(), abi::unstakeCall {}.abi_encode(), U256::ZERO)
            .await
            .unwrap();
        assert_eq!(
            outcome.tx_hash,
            "0xabc0000000000000000000000000000000000000000000000000000000000123"
        );
        assert_eq!(outcome.block_number, Some(10));
        assert_eq!(outcome.gas_used, Some(21_000));
        assert!(outcome.explorer_url.starts_with("https://test.xfiscan.com/tx/0xabc"));
    }

    #[tokio::test]
    async fn test_submit_transaction_surfaces_revert() {
        let mut server = mockito::Server::new_async().await;
        let _nonce = mock_method(&mut server, "eth_getTransactionCount", r#""0x0""#).await;
        let _gas_price = mock_method(&mut server, "eth_gasPrice", r#""0x3b9aca00""#).await;
        let _estimate = mock_method(&mut server, "eth_estimateGas", r#""0x5208""#).await;
        let _send = mock_method(
            &mut server,
            "eth_sendRawTransaction",
            r#""0xdead000000000000000000000000000000000000000000000000000000000001""#,
        )
        .await;
        let _receipt = mock_method(
            &mut server,
            "eth_getTransactionReceipt",
            r#"{"status":"0x0","blockNumber":"0xb"}"#,
        )
        .await;

        let client = test_client(&server.url());
        let result = client
            .submit_transaction(&test_signer(), abi::claimRewardsCall {}.abi_encode(), U256::ZERO)
            .await;
        assert!(matches!(result, Err(ChainClientError::Reverted(_))));
    }

    #[tokio::test]
    async fn test_estimate_failure_carries_revert_reason() {
        let mut server = mockito::Server::new_async().await;
        let _nonce = mock_method(&mut server, "eth_getTransactionCount", r#""0x0""#).await;
        let _gas_price = mock_method(&mut server, "eth_gasPrice", r#""0x3b9aca00""#).await;
        let _estimate = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJsonString(
                r#"{"method":"eth_estimateGas"}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted: Must stake to send messages"}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result = client
            .send_message(
                &test_signer(),
                Address::repeat_byte(0xBB),
                "ipfs://QmTest".to_string(),
                false,
            )
            .await;
        match result {
            Err(ChainClientError::Rpc { message, .. }) => {
                assert!(message.contains("Must stake to send messages"));
            }
            other => panic!("expected RPC error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_suggested_fees_floors_priority_fee() {
        let mut server = mockito::Server::new_async().await;
        // 1 wei gas price: the floor dominates
        let _gas_price = mock_method(&mut server, "eth_gasPrice", r#""0x1""#).await;

        let client = test_client(&server.url());
        let fees = client.suggested_fees().await.unwrap();
        assert_eq!(fees.max_priority_fee_per_gas, U256::from(MIN_PRIORITY_FEE_PER_GAS));
        // max fee must cover base + priority when the 4x buffer is tiny
        assert_eq!(fees.max_fee_per_gas, U256::from(MIN_PRIORITY_FEE_PER_GAS + 1));
    }

    #[tokio::test]
    async fn test_suggested_fees_buffers_normal_gas_price() {
        let mut server = mockito::Server::new_async().await;
        // 10 gwei
        let _gas_price = mock_method(&mut server, "eth_gasPrice", r#""0x2540be400""#).await;

        let client = test_client(&server.url());
        let fees = client.suggested_fees().await.unwrap();
        assert_eq!(fees.max_priority_fee_per_gas, U256::from(2_000_000_000u64));
        assert_eq!(fees.max_fee_per_gas, U256::from(40_000_000_000u64));
    }
}
