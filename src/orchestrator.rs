// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Transaction orchestration: local validation, submission, and the bounded
//! wait for confirmation.
//!
//! Every operation follows the same arc: check the session and network, run
//! the table-driven local guards, submit exactly one write per step, wait for
//! the receipt with a bounded timeout, then persist the outcome and refresh
//! the dashboard snapshots. Failed submissions are surfaced, never retried.
//! A receipt that does not arrive before the deadline leaves the transaction
//! in a pending state; the chain remains the source of truth.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use serde::Serialize;
use utoipa::ToSchema;

use crate::chain::{
    format_amount, parse_amount, ChainWriteError, ChainWriter, ContractAddresses, NetworkConfig,
    NetworkMismatchError, TxReceipt, NATIVE_DECIMALS, TOKEN_DECIMALS,
};
use crate::config::PurchaseRules;
use crate::session::{Reading, SessionController};
use crate::storage::{
    HistoryStore, PaymentMethod, StakeAction, StakingEvent, TransactionRecord, TxStatus,
};

/// Local guard failure. Raised before any network call; the user edits the
/// input and retries.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount is below the phase minimum of {minimum} CFD")]
    BelowMinimum { minimum: String },

    #[error("amount is above the phase maximum of {maximum} CFD")]
    AboveMaximum { maximum: String },

    #[error("insufficient {asset}: have {available}, need {required}")]
    InsufficientBalance {
        asset: &'static str,
        available: String,
        required: String,
    },

    #[error("{0} is unknown, refresh and try again")]
    BalanceUnknown(String),

    #[error("staking lock has not elapsed yet")]
    StakeLocked,
}

/// Transaction flow failure.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error("no wallet session")]
    NotConnected,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NetworkMismatch(NetworkMismatchError),

    /// The stable-coin approval reverted; the purchase was never submitted.
    #[error("approval failed on chain: {tx_hash}")]
    ApprovalFailed { tx_hash: String },

    /// The approval did not confirm before the deadline. The approval stays
    /// in flight on chain; the purchase was never submitted.
    #[error("approval still pending after {waited_secs}s: {tx_hash}")]
    ApprovalPending { tx_hash: String, waited_secs: u64 },

    #[error(transparent)]
    Write(#[from] ChainWriteError),
}

/// Result of one orchestrated transaction.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TxOutcome {
    pub tx_hash: String,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    pub explorer_url: String,
}

impl TxOutcome {
    fn pending(tx_hash: String, explorer_url: String) -> Self {
        Self {
            tx_hash,
            status: TxStatus::Pending,
            block_number: None,
            explorer_url,
        }
    }

    fn from_receipt(receipt: &TxReceipt, explorer_url: String) -> Self {
        Self {
            tx_hash: receipt.tx_hash.clone(),
            status: if receipt.success {
                TxStatus::Confirmed
            } else {
                TxStatus::Failed
            },
            block_number: Some(receipt.block_number),
            explorer_url,
        }
    }
}

/// Drives buy, stake, unstake, and claim flows end to end.
pub struct TxOrchestrator {
    writer: Arc<dyn ChainWriter>,
    controller: Arc<SessionController>,
    history: Arc<HistoryStore>,
    rules: PurchaseRules,
    contracts: ContractAddresses,
    network: NetworkConfig,
    receipt_timeout: Duration,
}

impl TxOrchestrator {
    pub fn new(
        writer: Arc<dyn ChainWriter>,
        controller: Arc<SessionController>,
        history: Arc<HistoryStore>,
        rules: PurchaseRules,
        contracts: ContractAddresses,
        network: NetworkConfig,
        receipt_timeout: Duration,
    ) -> Self {
        Self {
            writer,
            controller,
            history,
            rules,
            contracts,
            network,
            receipt_timeout,
        }
    }

    /// Buy CFD paying with the stable coin.
    ///
    /// Submits an approval for the exact cost, waits for it to confirm, and
    /// only then submits the purchase. If the approval reverts or its
    /// confirmation cannot be obtained the purchase is never submitted; an
    /// approval left in flight is harmless on its own.
    pub async fn purchase_with_stable_coin(&self, amount: &str) -> Result<TxOutcome, TxError> {
        let account = self.active_account().await?;
        let amount_wei = self.checked_purchase_amount(amount).await?;
        let cost = self.stable_cost(amount_wei).await?;
        self.require_stable_balance(cost).await?;

        let approve_hash = self
            .writer
            .approve_stable(account, self.contracts.token, cost)
            .await?;
        tracing::info!(account = %account, tx_hash = %approve_hash, "stable-coin approval submitted");

        match self
            .writer
            .wait_for_receipt(&approve_hash, self.receipt_timeout)
            .await?
        {
            Some(receipt) if receipt.success => {}
            Some(_) => {
                return Err(TxError::ApprovalFailed {
                    tx_hash: approve_hash,
                })
            }
            None => {
                return Err(TxError::ApprovalPending {
                    tx_hash: approve_hash,
                    waited_secs: self.receipt_timeout.as_secs(),
                })
            }
        }

        let tx_hash = self
            .writer
            .buy_tokens(account, amount_wei, self.contracts.stable_coin, None)
            .await?;

        let record = TransactionRecord::new_pending(
            tx_hash.clone(),
            format!("{account:#x}"),
            format_amount(amount_wei, TOKEN_DECIMALS),
            PaymentMethod::Stable,
            format_amount(cost, self.contracts.stable_decimals),
            self.network.explorer_tx_url(&tx_hash),
        );
        if let Err(e) = self.history.record_transaction(&record) {
            tracing::warn!(tx_hash = %tx_hash, error = %e, "failed to record purchase");
        }

        self.finalize_purchase(account, tx_hash).await
    }

    /// Buy CFD paying with the native coin, carried as call value.
    pub async fn purchase_with_native_coin(&self, amount: &str) -> Result<TxOutcome, TxError> {
        let account = self.active_account().await?;
        let amount_wei = self.checked_purchase_amount(amount).await?;
        let cost = self.native_cost(amount_wei).await?;
        self.require_native_balance(cost).await?;

        let tx_hash = self
            .writer
            .buy_tokens(account, amount_wei, Address::ZERO, Some(cost))
            .await?;

        let record = TransactionRecord::new_pending(
            tx_hash.clone(),
            format!("{account:#x}"),
            format_amount(amount_wei, TOKEN_DECIMALS),
            PaymentMethod::Native,
            format_amount(cost, NATIVE_DECIMALS),
            self.network.explorer_tx_url(&tx_hash),
        );
        if let Err(e) = self.history.record_transaction(&record) {
            tracing::warn!(tx_hash = %tx_hash, error = %e, "failed to record purchase");
        }

        self.finalize_purchase(account, tx_hash).await
    }

    /// Stake CFD into the contract ledger.
    pub async fn stake(&self, amount: &str) -> Result<TxOutcome, TxError> {
        let account = self.active_account().await?;
        let amount_wei = parse_positive(amount)?;

        if amount_wei < self.rules.min_stake {
            return Err(ValidationError::BelowMinimum {
                minimum: format_amount(self.rules.min_stake, TOKEN_DECIMALS),
            }
            .into());
        }

        let balances = self.balances().await?;
        let available = known_amount(&balances.token, "CFD balance")?;
        if amount_wei > available {
            return Err(ValidationError::InsufficientBalance {
                asset: "CFD",
                available: format_amount(available, TOKEN_DECIMALS),
                required: format_amount(amount_wei, TOKEN_DECIMALS),
            }
            .into());
        }

        let tx_hash = self.writer.stake(account, amount_wei).await?;
        self.record_staking_event(
            &tx_hash,
            account,
            StakeAction::Stake,
            Some(format_amount(amount_wei, TOKEN_DECIMALS)),
        );

        self.finalize_staking(account, tx_hash).await
    }

    /// Unstake previously staked CFD.
    ///
    /// Blocked locally while the lock period has not elapsed. A lock state
    /// that could not be read counts as locked; the contract would reject
    /// the call anyway, this just saves the gas.
    pub async fn unstake(&self, amount: &str) -> Result<TxOutcome, TxError> {
        let account = self.active_account().await?;
        let amount_wei = parse_positive(amount)?;

        let staking = self
            .controller
            .view()
            .await
            .staking
            .ok_or_else(|| ValidationError::BalanceUnknown("staking status".to_string()))?;
        if !staking.can_unstake {
            return Err(ValidationError::StakeLocked.into());
        }

        let staked = known_amount(
            &self.balances().await?.staked,
            "staked balance",
        )?;
        if amount_wei > staked {
            return Err(ValidationError::InsufficientBalance {
                asset: "staked CFD",
                available: format_amount(staked, TOKEN_DECIMALS),
                required: format_amount(amount_wei, TOKEN_DECIMALS),
            }
            .into());
        }

        let tx_hash = self.writer.unstake(account, amount_wei).await?;
        self.record_staking_event(
            &tx_hash,
            account,
            StakeAction::Unstake,
            Some(format_amount(amount_wei, TOKEN_DECIMALS)),
        );

        self.finalize_staking(account, tx_hash).await
    }

    /// Claim accumulated casino-profit rewards.
    pub async fn claim_rewards(&self) -> Result<TxOutcome, TxError> {
        let account = self.active_account().await?;

        let tx_hash = self.writer.claim_rewards(account).await?;
        self.record_staking_event(&tx_hash, account, StakeAction::Claim, None);

        self.finalize_staking(account, tx_hash).await
    }

    /// Single receipt lookup, for the status endpoint's polling.
    pub async fn probe_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, ChainWriteError> {
        self.writer.receipt(tx_hash).await
    }

    /// The connected account, provided the wallet is on the configured chain.
    async fn active_account(&self) -> Result<Address, TxError> {
        let session = self.controller.session().await;
        let account = session.account.ok_or(TxError::NotConnected)?;
        match session.chain_id {
            Some(chain_id) if chain_id == self.network.chain_id => Ok(account),
            Some(chain_id) => Err(TxError::NetworkMismatch(NetworkMismatchError {
                expected: self.network.chain_id,
                actual: chain_id,
            })),
            None => Err(TxError::NotConnected),
        }
    }

    async fn balances(&self) -> Result<crate::session::BalanceSnapshot, ValidationError> {
        self.controller
            .view()
            .await
            .balances
            .ok_or_else(|| ValidationError::BalanceUnknown("balances".to_string()))
    }

    /// Parse and apply the phase purchase limits.
    async fn checked_purchase_amount(&self, amount: &str) -> Result<U256, TxError> {
        let amount_wei = parse_positive(amount)?;

        let phase = self.controller.view().await.ico.phase;
        let rule = self.rules.rule_for(phase);
        if amount_wei < rule.min_purchase {
            return Err(ValidationError::BelowMinimum {
                minimum: format_amount(rule.min_purchase, TOKEN_DECIMALS),
            }
            .into());
        }
        if amount_wei > rule.max_purchase {
            return Err(ValidationError::AboveMaximum {
                maximum: format_amount(rule.max_purchase, TOKEN_DECIMALS),
            }
            .into());
        }
        Ok(amount_wei)
    }

    /// Current price per token in native-coin wei, from the live ICO status
    /// or its configured fallback.
    async fn price_wei(&self) -> Result<U256, ValidationError> {
        let ico = self.controller.ico_info().await;
        let price = parse_amount(&ico.price_per_token, NATIVE_DECIMALS)
            .map_err(|e| ValidationError::InvalidAmount(e.to_string()))?;
        if price.is_zero() {
            return Err(ValidationError::InvalidAmount(
                "token price unavailable".to_string(),
            ));
        }
        Ok(price)
    }

    /// Purchase cost in stable-coin base units, rounded up so the approval
    /// always covers the contract's own price math.
    async fn stable_cost(&self, amount_wei: U256) -> Result<U256, TxError> {
        let price = self.price_wei().await?;
        let numerator = amount_wei
            .checked_mul(price)
            .ok_or_else(|| ValidationError::InvalidAmount("amount too large".to_string()))?;
        let scale = 18 + (18u64.saturating_sub(self.contracts.stable_decimals as u64));
        let denominator = U256::from(10u64).pow(U256::from(scale));
        Ok(div_ceil(numerator, denominator))
    }

    /// Purchase cost in native-coin wei.
    async fn native_cost(&self, amount_wei: U256) -> Result<U256, TxError> {
        let price = self.price_wei().await?;
        let numerator = amount_wei
            .checked_mul(price)
            .ok_or_else(|| ValidationError::InvalidAmount("amount too large".to_string()))?;
        let denominator = U256::from(10u64).pow(U256::from(18u64));
        Ok(div_ceil(numerator, denominator))
    }

    async fn require_stable_balance(&self, cost: U256) -> Result<(), TxError> {
        let balances = self.balances().await?;
        let available = known_amount(&balances.stable_coin, "stable-coin balance")?;
        if cost > available {
            return Err(ValidationError::InsufficientBalance {
                asset: "stable coin",
                available: format_amount(available, self.contracts.stable_decimals),
                required: format_amount(cost, self.contracts.stable_decimals),
            }
            .into());
        }
        Ok(())
    }

    async fn require_native_balance(&self, cost: U256) -> Result<(), TxError> {
        let balances = self.balances().await?;
        let available = known_amount(&balances.native_coin, "native-coin balance")?;
        if cost > available {
            return Err(ValidationError::InsufficientBalance {
                asset: "native coin",
                available: format_amount(available, NATIVE_DECIMALS),
                required: format_amount(cost, NATIVE_DECIMALS),
            }
            .into());
        }
        Ok(())
    }

    fn record_staking_event(
        &self,
        tx_hash: &str,
        account: Address,
        action: StakeAction,
        amount: Option<String>,
    ) {
        let event = StakingEvent::new_pending(
            tx_hash.to_string(),
            format!("{account:#x}"),
            action,
            amount,
            self.network.explorer_tx_url(tx_hash),
        );
        if let Err(e) = self.history.record_staking_event(&event) {
            tracing::warn!(tx_hash, error = %e, "failed to record staking event");
        }
    }

    /// Bounded receipt wait. RPC failures while polling leave the
    /// transaction pending rather than reporting a false failure.
    async fn await_receipt(&self, tx_hash: &str) -> Option<TxReceipt> {
        match self
            .writer
            .wait_for_receipt(tx_hash, self.receipt_timeout)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!(tx_hash, error = %e, "receipt poll failed, leaving transaction pending");
                None
            }
        }
    }

    async fn finalize_purchase(
        &self,
        account: Address,
        tx_hash: String,
    ) -> Result<TxOutcome, TxError> {
        let explorer_url = self.network.explorer_tx_url(&tx_hash);
        match self.await_receipt(&tx_hash).await {
            None => {
                tracing::info!(tx_hash = %tx_hash, "purchase still pending at deadline");
                Ok(TxOutcome::pending(tx_hash, explorer_url))
            }
            Some(receipt) => {
                if let Err(e) = self.history.apply_transaction_receipt(
                    &tx_hash,
                    receipt.success,
                    receipt.block_number,
                    receipt.gas_used,
                ) {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "failed to update purchase record");
                }
                // refresh even after a revert: gas was spent
                self.controller.refresh(account).await;
                Ok(TxOutcome::from_receipt(&receipt, explorer_url))
            }
        }
    }

    async fn finalize_staking(
        &self,
        account: Address,
        tx_hash: String,
    ) -> Result<TxOutcome, TxError> {
        let explorer_url = self.network.explorer_tx_url(&tx_hash);
        match self.await_receipt(&tx_hash).await {
            None => {
                tracing::info!(tx_hash = %tx_hash, "staking transaction still pending at deadline");
                Ok(TxOutcome::pending(tx_hash, explorer_url))
            }
            Some(receipt) => {
                if let Err(e) = self.history.apply_staking_receipt(
                    &tx_hash,
                    receipt.success,
                    receipt.block_number,
                    receipt.gas_used,
                ) {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "failed to update staking event");
                }
                self.controller.refresh(account).await;
                Ok(TxOutcome::from_receipt(&receipt, explorer_url))
            }
        }
    }
}

/// Parse a human-readable CFD amount and reject zero.
fn parse_positive(amount: &str) -> Result<U256, ValidationError> {
    let amount_wei = parse_amount(amount, TOKEN_DECIMALS)
        .map_err(|e| ValidationError::InvalidAmount(e.to_string()))?;
    if amount_wei.is_zero() {
        return Err(ValidationError::ZeroAmount);
    }
    Ok(amount_wei)
}

fn known_amount(reading: &Reading, what: &'static str) -> Result<U256, ValidationError> {
    reading
        .raw_value()
        .ok_or_else(|| ValidationError::BalanceUnknown(what.to_string()))
}

fn div_ceil(numerator: U256, denominator: U256) -> U256 {
    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        quotient
    } else {
        quotient + U256::from(1u64)
    }
}
