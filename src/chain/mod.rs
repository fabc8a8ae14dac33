// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Chain client adapter for the Polygon PoS network.
//!
//! Everything on-chain goes through two seams: [`ChainReader`] for view
//! calls and [`ChainWriter`] for transaction submission. The concrete
//! implementations ([`PolygonClient`], [`TxSender`]) speak JSON-RPC through
//! alloy; tests substitute in-memory fakes. Contract addresses and the
//! method surface are externally supplied configuration; no contract logic
//! lives in this crate.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

pub mod client;
pub mod erc20;
pub mod signing;
pub mod token;
pub mod transactions;
pub mod types;

pub use client::PolygonClient;
pub use signing::KeyStore;
pub use transactions::{format_amount, parse_amount, TxSender};
pub use types::{
    network_for_chain, ChainReadError, ChainWriteError, ContractAddresses, IcoStatus,
    NetworkConfig, NetworkMismatchError, TxReceipt, NATIVE_DECIMALS, POLYGON_AMOY,
    POLYGON_MAINNET, TOKEN_DECIMALS,
};

/// Read-only chain access.
///
/// A failed read means the value is unknown; callers must never substitute
/// zero for an `Err`.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Chain id reported by the RPC endpoint.
    async fn chain_id(&self) -> Result<u64, ChainReadError>;

    /// Native coin balance (MATIC/POL) in wei.
    async fn native_balance(&self, account: Address) -> Result<U256, ChainReadError>;

    /// Liquid CFD token balance.
    async fn token_balance(&self, account: Address) -> Result<U256, ChainReadError>;

    /// Stable-coin balance.
    async fn stable_balance(&self, account: Address) -> Result<U256, ChainReadError>;

    /// CFD staked by the account.
    async fn staked_balance(&self, account: Address) -> Result<U256, ChainReadError>;

    /// Total CFD staked across all accounts.
    async fn total_staked(&self) -> Result<U256, ChainReadError>;

    /// Total CFD supply.
    async fn total_supply(&self) -> Result<U256, ChainReadError>;

    /// Whether the account's staking lock has elapsed.
    async fn can_unstake(&self, account: Address) -> Result<bool, ChainReadError>;

    /// Claimable casino-profit rewards.
    async fn pending_rewards(&self, account: Address) -> Result<U256, ChainReadError>;

    /// Current ICO phase, price, and remaining allocation.
    async fn ico_status(&self) -> Result<IcoStatus, ChainReadError>;
}

/// Transaction submission.
///
/// Each write submits exactly one transaction and returns its hash without
/// waiting for inclusion; confirmation is a separate, explicitly bounded
/// wait. Writes are never retried here or anywhere above.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Approve the token contract to pull `amount` of stable coin.
    async fn approve_stable(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<String, ChainWriteError>;

    /// Buy `token_amount` CFD, paying with `payment_token`. The native path
    /// carries the payment as `native_value` on the same call.
    async fn buy_tokens(
        &self,
        from: Address,
        token_amount: U256,
        payment_token: Address,
        native_value: Option<U256>,
    ) -> Result<String, ChainWriteError>;

    /// Stake CFD into the contract's internal ledger.
    async fn stake(&self, from: Address, amount: U256) -> Result<String, ChainWriteError>;

    /// Unstake previously staked CFD.
    async fn unstake(&self, from: Address, amount: U256) -> Result<String, ChainWriteError>;

    /// Claim accumulated rewards.
    async fn claim_rewards(&self, from: Address) -> Result<String, ChainWriteError>;

    /// One receipt lookup; `Ok(None)` while the transaction is unconfirmed.
    async fn receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, ChainWriteError>;

    /// Interval between receipt polls in [`ChainWriter::wait_for_receipt`].
    fn poll_interval(&self) -> Duration {
        Duration::from_secs(2)
    }

    /// Poll for a receipt until `timeout` elapses.
    ///
    /// Returns `Ok(None)` when the transaction is still pending at the
    /// deadline; the transaction itself remains in flight and may confirm
    /// later.
    async fn wait_for_receipt(
        &self,
        tx_hash: &str,
        timeout: Duration,
    ) -> Result<Option<TxReceipt>, ChainWriteError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(receipt) = self.receipt(tx_hash).await? {
                return Ok(Some(receipt));
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }
}
