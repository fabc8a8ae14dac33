// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Dashboard snapshot types.
//!
//! Snapshots are immutable once produced: a refresh cycle builds a new
//! [`BalanceSnapshot`] and [`StakingSnapshot`] pair from one joined read set
//! and replaces both in a single commit. Individual figures are [`Reading`]s
//! so a failed read shows as unknown instead of a false zero.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chain::{
    format_amount, ChainReadError, IcoStatus, NATIVE_DECIMALS, TOKEN_DECIMALS,
};

/// Outcome of one on-chain read.
///
/// `raw` is the integer chain value in the asset's smallest unit, as a
/// decimal string; `formatted` is the human-readable decimal string. For
/// derived percentages the smallest unit is 1e-4 percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Reading {
    /// Value decoded from the chain.
    Known { raw: String, formatted: String },
    /// The read failed; the value is unknown, not zero.
    Unknown { reason: String },
}

impl Reading {
    /// A known amount in smallest units, formatted with `decimals`.
    pub fn known(value: U256, decimals: u8) -> Self {
        Reading::Known {
            raw: value.to_string(),
            formatted: format_amount(value, decimals),
        }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Reading::Unknown {
            reason: reason.into(),
        }
    }

    /// Build from a chain read result.
    pub fn from_read(result: &Result<U256, ChainReadError>, decimals: u8) -> Self {
        match result {
            Ok(value) => Self::known(*value, decimals),
            Err(e) => Self::unknown(e.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Reading::Known { .. })
    }

    /// The raw integer value, when known.
    pub fn raw_value(&self) -> Option<U256> {
        match self {
            Reading::Known { raw, .. } => raw.parse().ok(),
            Reading::Unknown { .. } => None,
        }
    }

    /// The formatted decimal string, when known.
    pub fn formatted(&self) -> Option<&str> {
        match self {
            Reading::Known { formatted, .. } => Some(formatted),
            Reading::Unknown { .. } => None,
        }
    }
}

/// Current wallet-connection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub connected: bool,
    /// Connected account, absent when disconnected.
    #[schema(value_type = Option<String>)]
    pub account: Option<Address>,
    /// Chain id reported by the wallet provider at connect time.
    pub chain_id: Option<u64>,
}

impl Session {
    pub fn empty() -> Self {
        Self {
            connected: false,
            account: None,
            chain_id: None,
        }
    }

    pub fn connected(account: Address, chain_id: u64) -> Self {
        Self {
            connected: true,
            account: Some(account),
            chain_id: Some(chain_id),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::empty()
    }
}

/// Account balances across the four assets the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BalanceSnapshot {
    /// Account the snapshot was taken for.
    #[schema(value_type = String)]
    pub account: Address,
    /// Liquid CFD balance.
    pub token: Reading,
    /// Stable-coin balance (USDT).
    pub stable_coin: Reading,
    /// Native coin balance (MATIC/POL).
    pub native_coin: Reading,
    /// CFD staked in the contract ledger.
    pub staked: Reading,
    pub fetched_at: DateTime<Utc>,
}

/// Staking position derived from the same read set as [`BalanceSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StakingSnapshot {
    #[schema(value_type = String)]
    pub account: Address,
    /// Total CFD staked across all accounts.
    pub total_staked: Reading,
    /// Account's share of total supply, in percent (4 decimal places).
    pub user_share_percent: Reading,
    /// Account's share of the staking pool, in percent (4 decimal places).
    pub pool_share_percent: Reading,
    /// Whether the staking lock period has elapsed. Falls back to `false`
    /// when the read fails; the contract remains the final authority.
    pub can_unstake: bool,
    /// Claimable casino-profit rewards.
    pub pending_rewards: Reading,
    pub fetched_at: DateTime<Utc>,
}

/// ICO sale status shown on the landing page and purchase form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IcoPhaseInfo {
    /// Current sale phase.
    pub phase: u64,
    /// Price per CFD in native-coin units.
    pub price_per_token: String,
    /// Tokens remaining in the current phase.
    pub tokens_remaining: String,
    /// True when this is the configured fallback rather than a live read.
    pub is_fallback: bool,
}

impl IcoPhaseInfo {
    pub fn from_status(status: &IcoStatus) -> Self {
        Self {
            phase: status.phase,
            price_per_token: format_amount(status.price, NATIVE_DECIMALS),
            tokens_remaining: format_amount(status.tokens_remaining, TOKEN_DECIMALS),
            is_fallback: false,
        }
    }
}

/// One joined set of chain reads, taken for a single account.
///
/// Both snapshots are built from this set and nothing else; that is what
/// makes the atomic-replace invariant meaningful.
pub(crate) struct ReadSet {
    pub token: Result<U256, ChainReadError>,
    pub stable: Result<U256, ChainReadError>,
    pub native: Result<U256, ChainReadError>,
    pub staked: Result<U256, ChainReadError>,
    pub total_staked: Result<U256, ChainReadError>,
    pub total_supply: Result<U256, ChainReadError>,
    pub can_unstake: Result<bool, ChainReadError>,
    pub pending_rewards: Result<U256, ChainReadError>,
}

impl ReadSet {
    /// Names and reasons of the reads that failed, for logging.
    pub fn failures(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let mut push = |name: &'static str, err: Option<&ChainReadError>| {
            if let Some(e) = err {
                out.push((name, e.to_string()));
            }
        };
        push("token_balance", self.token.as_ref().err());
        push("stable_balance", self.stable.as_ref().err());
        push("native_balance", self.native.as_ref().err());
        push("staked_balance", self.staked.as_ref().err());
        push("total_staked", self.total_staked.as_ref().err());
        push("total_supply", self.total_supply.as_ref().err());
        push("can_unstake", self.can_unstake.as_ref().err());
        push("pending_rewards", self.pending_rewards.as_ref().err());
        out
    }

    /// Derive both snapshots from this read set.
    pub fn into_snapshots(
        self,
        account: Address,
        stable_decimals: u8,
        fetched_at: DateTime<Utc>,
    ) -> (BalanceSnapshot, StakingSnapshot) {
        let balances = BalanceSnapshot {
            account,
            token: Reading::from_read(&self.token, TOKEN_DECIMALS),
            stable_coin: Reading::from_read(&self.stable, stable_decimals),
            native_coin: Reading::from_read(&self.native, NATIVE_DECIMALS),
            staked: Reading::from_read(&self.staked, TOKEN_DECIMALS),
            fetched_at,
        };

        let user_share_percent = derive_share(&self.token, &self.total_supply);
        let pool_share_percent = derive_share(&self.staked, &self.total_staked);

        let staking = StakingSnapshot {
            account,
            total_staked: Reading::from_read(&self.total_staked, TOKEN_DECIMALS),
            user_share_percent,
            pool_share_percent,
            // Unknown eligibility degrades to "locked"; unstake stays blocked
            // until a successful read says otherwise.
            can_unstake: *self.can_unstake.as_ref().unwrap_or(&false),
            pending_rewards: Reading::from_read(&self.pending_rewards, TOKEN_DECIMALS),
            fetched_at,
        };

        (balances, staking)
    }
}

/// Percentage share of `part` in `whole`, unknown if either read failed.
fn derive_share(
    part: &Result<U256, ChainReadError>,
    whole: &Result<U256, ChainReadError>,
) -> Reading {
    match (part, whole) {
        (Ok(part), Ok(whole)) => share_percent(*part, *whole),
        (Err(e), _) => Reading::unknown(e.to_string()),
        (_, Err(e)) => Reading::unknown(e.to_string()),
    }
}

/// `part / whole * 100` with 4 decimal places, `"0"` for an empty whole.
pub fn share_percent(part: U256, whole: U256) -> Reading {
    if whole.is_zero() {
        return Reading::known(U256::ZERO, 4);
    }

    // Scale to 1e-4 percent units: part * 100 * 10^4 / whole.
    let scaled = match part.checked_mul(U256::from(1_000_000u64)) {
        Some(numerator) => numerator / whole,
        // Out-of-range input; give up precision instead of overflowing.
        None => (part / whole).saturating_mul(U256::from(1_000_000u64)),
    };

    Reading::known(scaled, 4)
}
