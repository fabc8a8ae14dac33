// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! CFD token contract interactions.
//!
//! The token contract bundles the ERC-20 ledger with the ICO sale and the
//! staking ledger. It is deployed externally; only its address and method
//! surface are configured here. All methods below are read-only; state
//! changes go through [`crate::chain::TxSender`], which encodes calldata
//! from the same interface.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::types::{ChainReadError, IcoStatus};

// Sale, staking, and reward surface of the deployed CFD token contract.
sol! {
    #[sol(rpc)]
    interface ICfdToken {
        function balanceOf(address account) external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);

        function stakedBalance(address account) external view returns (uint256);
        function totalStaked() external view returns (uint256);
        function canUnstake(address account) external view returns (bool);
        function pendingRewards(address account) external view returns (uint256);

        function currentPhase() external view returns (uint256);
        function currentPrice() external view returns (uint256);
        function tokensRemaining() external view returns (uint256);

        function stake(uint256 amount) external;
        function unstake(uint256 amount) external;
        function claimRewards() external;
        function buyTokens(uint256 amount, address paymentToken) external payable;
    }
}

/// CFD token contract wrapper.
pub struct CfdTokenContract<P> {
    contract: ICfdToken::ICfdTokenInstance<P>,
}

impl<P: Provider + Clone> CfdTokenContract<P> {
    /// Create a new contract instance at the deployed address.
    pub fn new(provider: &P, address: Address) -> Self {
        Self {
            contract: ICfdToken::new(address, provider.clone()),
        }
    }

    /// Liquid CFD balance of an account.
    pub async fn balance_of(&self, account: Address) -> Result<U256, ChainReadError> {
        self.contract
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| ChainReadError::Contract(e.to_string()))
    }

    /// Total CFD supply.
    pub async fn total_supply(&self) -> Result<U256, ChainReadError> {
        self.contract
            .totalSupply()
            .call()
            .await
            .map_err(|e| ChainReadError::Contract(e.to_string()))
    }

    /// CFD staked by an account in the contract's internal ledger.
    pub async fn staked_balance(&self, account: Address) -> Result<U256, ChainReadError> {
        self.contract
            .stakedBalance(account)
            .call()
            .await
            .map_err(|e| ChainReadError::Contract(e.to_string()))
    }

    /// Total CFD staked across all accounts.
    pub async fn total_staked(&self) -> Result<U256, ChainReadError> {
        self.contract
            .totalStaked()
            .call()
            .await
            .map_err(|e| ChainReadError::Contract(e.to_string()))
    }

    /// Whether the account's staking lock period has elapsed.
    pub async fn can_unstake(&self, account: Address) -> Result<bool, ChainReadError> {
        self.contract
            .canUnstake(account)
            .call()
            .await
            .map_err(|e| ChainReadError::Contract(e.to_string()))
    }

    /// Casino-profit rewards claimable by an account.
    pub async fn pending_rewards(&self, account: Address) -> Result<U256, ChainReadError> {
        self.contract
            .pendingRewards(account)
            .call()
            .await
            .map_err(|e| ChainReadError::Contract(e.to_string()))
    }

    /// Current ICO sale status: phase, price, and remaining allocation.
    ///
    /// The three reads are issued concurrently; any single failure fails the
    /// whole status read (callers fall back to a configured default).
    pub async fn ico_status(&self) -> Result<IcoStatus, ChainReadError> {
        let phase_call = self.contract.currentPhase();
        let price_call = self.contract.currentPrice();
        let remaining_call = self.contract.tokensRemaining();
        let (phase, price, remaining) = tokio::join!(
            phase_call.call(),
            price_call.call(),
            remaining_call.call(),
        );

        let phase = phase.map_err(|e| ChainReadError::Contract(e.to_string()))?;
        let price = price.map_err(|e| ChainReadError::Contract(e.to_string()))?;
        let tokens_remaining = remaining.map_err(|e| ChainReadError::Contract(e.to_string()))?;

        Ok(IcoStatus {
            phase: phase.saturating_to::<u64>(),
            price,
            tokens_remaining,
        })
    }
}
