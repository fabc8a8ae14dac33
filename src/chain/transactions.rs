// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Transaction submission for the CFD token and stable-coin contracts.
//!
//! Builds EIP-1559 transactions with calldata encoded from the contract
//! interfaces, signs them with the keystore key of the submitting account,
//! and broadcasts through the configured RPC endpoint. The wallet-filled
//! provider is constructed per operation; key material never outlives a
//! single submission.

use std::time::Duration;

use alloy::{
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use async_trait::async_trait;

use super::client::HttpProvider;
use super::erc20::IERC20;
use super::signing::KeyStore;
use super::token::ICfdToken;
use super::types::*;
use super::ChainWriter;

// Polygon validators generally require a 25+ gwei priority fee.
const PRIORITY_FEE_WEI: u128 = 30_000_000_000;
// Base fee assumed when the latest block carries none.
const FALLBACK_BASE_FEE_WEI: u128 = 25_000_000_000;

/// Transaction sender for the dashboard's write operations.
pub struct TxSender {
    network: NetworkConfig,
    rpc_url: url::Url,
    contracts: ContractAddresses,
    keys: KeyStore,
    poll_interval: Duration,
    /// Read-side provider for fee data and receipt lookups.
    provider: HttpProvider,
}

impl TxSender {
    /// Create a sender against an RPC endpoint and keystore.
    pub fn connect(
        network: NetworkConfig,
        rpc_url: &str,
        contracts: ContractAddresses,
        keys: KeyStore,
        poll_interval: Duration,
    ) -> Result<Self, ChainWriteError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainWriteError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url.clone());

        Ok(Self {
            network,
            rpc_url: url,
            contracts,
            keys,
            poll_interval,
            provider,
        })
    }

    /// Verify the RPC endpoint serves the configured chain.
    ///
    /// Runs before every submission; a switch to the right network is the
    /// wallet provider's job, this side only refuses to submit.
    async fn ensure_network(&self) -> Result<(), ChainWriteError> {
        let actual = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| ChainWriteError::Rpc(e.to_string()))?;

        if actual != self.network.chain_id {
            return Err(NetworkMismatchError {
                expected: self.network.chain_id,
                actual,
            }
            .into());
        }
        Ok(())
    }

    /// Get current gas prices from the network.
    async fn gas_prices(&self) -> Result<(u128, u128), ChainWriteError> {
        let block = self
            .provider
            .get_block_by_number(alloy::eips::BlockNumberOrTag::Latest)
            .await
            .map_err(|e| ChainWriteError::Rpc(format!("failed to get block: {}", e)))?
            .ok_or_else(|| ChainWriteError::Rpc("no latest block".to_string()))?;

        let base_fee: u128 = block
            .header
            .base_fee_per_gas
            .map(|f| f as u128)
            .unwrap_or(FALLBACK_BASE_FEE_WEI);

        // Max fee = 2 * base_fee + priority_fee (allows for base fee increase)
        let max_fee = base_fee.saturating_mul(2).saturating_add(PRIORITY_FEE_WEI);

        Ok((max_fee, PRIORITY_FEE_WEI))
    }

    /// Sign and broadcast one transaction, returning its hash.
    async fn submit(
        &self,
        from: Address,
        to: Address,
        calldata: Vec<u8>,
        value: Option<U256>,
    ) -> Result<String, ChainWriteError> {
        self.ensure_network().await?;

        let wallet = self.keys.wallet_for(from)?;
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone());

        let (max_fee_per_gas, max_priority_fee_per_gas) = self.gas_prices().await?;

        let mut tx = TransactionRequest::default()
            .from(from)
            .to(to)
            .input(calldata.into())
            .max_fee_per_gas(max_fee_per_gas)
            .max_priority_fee_per_gas(max_priority_fee_per_gas);

        if let Some(value) = value {
            tx = tx.value(value);
        }

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(classify_send_error)?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        tracing::info!(tx_hash = %tx_hash, to = %to, "transaction submitted");
        Ok(tx_hash)
    }
}

#[async_trait]
impl ChainWriter for TxSender {
    async fn approve_stable(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<String, ChainWriteError> {
        let call = IERC20::approveCall { spender, amount };
        self.submit(from, self.contracts.stable_coin, call.abi_encode(), None)
            .await
    }

    async fn buy_tokens(
        &self,
        from: Address,
        token_amount: U256,
        payment_token: Address,
        native_value: Option<U256>,
    ) -> Result<String, ChainWriteError> {
        let call = ICfdToken::buyTokensCall {
            amount: token_amount,
            paymentToken: payment_token,
        };
        self.submit(from, self.contracts.token, call.abi_encode(), native_value)
            .await
    }

    async fn stake(&self, from: Address, amount: U256) -> Result<String, ChainWriteError> {
        let call = ICfdToken::stakeCall { amount };
        self.submit(from, self.contracts.token, call.abi_encode(), None)
            .await
    }

    async fn unstake(&self, from: Address, amount: U256) -> Result<String, ChainWriteError> {
        let call = ICfdToken::unstakeCall { amount };
        self.submit(from, self.contracts.token, call.abi_encode(), None)
            .await
    }

    async fn claim_rewards(&self, from: Address) -> Result<String, ChainWriteError> {
        let call = ICfdToken::claimRewardsCall {};
        self.submit(from, self.contracts.token, call.abi_encode(), None)
            .await
    }

    async fn receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, ChainWriteError> {
        let hash = tx_hash
            .parse()
            .map_err(|e| ChainWriteError::InvalidTxHash(format!("{}: {}", tx_hash, e)))?;

        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainWriteError::Rpc(format!("failed to get receipt: {}", e)))?;

        Ok(receipt.map(|r| TxReceipt {
            tx_hash: tx_hash.to_string(),
            block_number: r.block_number.unwrap_or(0),
            gas_used: r.gas_used as u64,
            success: r.status(),
        }))
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// Map a submission error onto the write taxonomy.
fn classify_send_error(e: impl std::fmt::Display) -> ChainWriteError {
    let msg = e.to_string();
    if msg.contains("insufficient funds") {
        ChainWriteError::InsufficientFunds(msg)
    } else {
        ChainWriteError::Rejected(msg)
    }
}

/// Error parsing a human-readable decimal amount.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AmountParseError(String);

/// Parse a human-readable amount to the asset's smallest unit.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (18 for CFD/native, 6 for USDT)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountParseError> {
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 {
        return Err(AmountParseError("invalid amount format".to_string()));
    }

    let whole = parts[0]
        .parse::<u128>()
        .map_err(|_| AmountParseError("invalid whole number".to_string()))?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(AmountParseError(format!(
                "too many decimal places (max {})",
                decimals
            )));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| AmountParseError("invalid decimal".to_string()))?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or_else(|| AmountParseError("amount overflow".to_string()))?;

    Ok(U256::from(total))
}

/// Format an amount in smallest units to a human-readable decimal string.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}
