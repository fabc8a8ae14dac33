// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Wallet session lifecycle and dashboard state.
//!
//! [`SessionController`] owns the single active session and the snapshots
//! derived from it. Connection events come in over the API from the wallet
//! provider relay; every event that changes the session identity bumps an
//! epoch counter, and a refresh only commits its snapshots if the epoch and
//! account it started under are still current. A slow response from a
//! previous session is discarded, never merged.

pub mod snapshot;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::chain::{ChainReadError, ChainReader, NetworkConfig};

pub use snapshot::{BalanceSnapshot, IcoPhaseInfo, Reading, Session, StakingSnapshot};

use snapshot::ReadSet;

/// Everything the dashboard renders, in one consistent view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardView {
    pub session: Session,
    /// Present only while a session is active and at least one refresh
    /// committed for it.
    pub balances: Option<BalanceSnapshot>,
    pub staking: Option<StakingSnapshot>,
    pub ico: IcoPhaseInfo,
    /// True while a refresh for the current session is in flight.
    pub refreshing: bool,
}

/// What happened to a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshots were committed to the dashboard state.
    Committed,
    /// The session changed while reads were in flight; results dropped.
    Discarded,
}

struct DashboardState {
    session: Session,
    balances: Option<BalanceSnapshot>,
    staking: Option<StakingSnapshot>,
    ico: IcoPhaseInfo,
    refreshing: bool,
}

/// Owns the active wallet session and its derived snapshots.
pub struct SessionController {
    chain: Arc<dyn ChainReader>,
    network: NetworkConfig,
    stable_decimals: u8,
    ico_fallback: IcoPhaseInfo,
    state: RwLock<DashboardState>,
    /// Bumped on every connect, account switch and disconnect.
    epoch: AtomicU64,
}

impl SessionController {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        network: NetworkConfig,
        stable_decimals: u8,
        ico_fallback: IcoPhaseInfo,
    ) -> Self {
        Self {
            chain,
            network,
            stable_decimals,
            state: RwLock::new(DashboardState {
                session: Session::empty(),
                balances: None,
                staking: None,
                ico: ico_fallback.clone(),
                refreshing: false,
            }),
            ico_fallback,
            epoch: AtomicU64::new(0),
        }
    }

    /// Current dashboard state.
    pub async fn view(&self) -> DashboardView {
        let st = self.state.read().await;
        DashboardView {
            session: st.session.clone(),
            balances: st.balances.clone(),
            staking: st.staking.clone(),
            ico: st.ico.clone(),
            refreshing: st.refreshing,
        }
    }

    pub async fn session(&self) -> Session {
        self.state.read().await.session.clone()
    }

    /// Account of the active session, if any.
    pub async fn current_account(&self) -> Option<Address> {
        self.state.read().await.session.account
    }

    /// One chain-id read against the RPC, for readiness probes.
    pub async fn probe_chain(&self) -> Result<u64, ChainReadError> {
        self.chain.chain_id().await
    }

    /// Begin a session for `account` as reported by the wallet provider.
    ///
    /// Replaces any previous session, drops its snapshots and runs a full
    /// refresh before returning. A `chain_id` other than the configured
    /// network is recorded as-is; reads still go to the configured RPC and
    /// writes are refused until the wallet switches back.
    pub async fn connect(&self, account: Address, chain_id: u64) -> DashboardView {
        {
            let mut st = self.state.write().await;
            self.epoch.fetch_add(1, Ordering::SeqCst);
            st.session = Session::connected(account, chain_id);
            st.balances = None;
            st.staking = None;
            st.refreshing = true;
        }

        if chain_id != self.network.chain_id {
            tracing::warn!(
                account = %account,
                chain_id,
                expected = self.network.chain_id,
                "wallet connected on the wrong network, transactions disabled"
            );
        } else {
            tracing::info!(account = %account, chain_id, "wallet connected");
        }

        self.refresh(account).await;
        self.view().await
    }

    /// End the active session. Safe to call when none is active.
    pub async fn disconnect(&self) -> Session {
        let mut st = self.state.write().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if st.session.connected {
            tracing::info!(account = ?st.session.account, "wallet disconnected");
        }
        st.session = Session::empty();
        st.balances = None;
        st.staking = None;
        st.refreshing = false;
        st.session.clone()
    }

    /// Wallet provider reported a new account selection.
    ///
    /// `None` (no accounts left) ends the session; a new account replaces
    /// the session wholesale, it is never treated as an in-place update.
    pub async fn account_changed(&self, account: Option<Address>) -> DashboardView {
        match account {
            None => {
                self.disconnect().await;
                self.view().await
            }
            Some(account) => {
                let chain_id = self
                    .session()
                    .await
                    .chain_id
                    .unwrap_or(self.network.chain_id);
                self.connect(account, chain_id).await
            }
        }
    }

    /// Wallet provider reported a chain switch. The session is torn down;
    /// the wallet reconnects explicitly on the new chain.
    pub async fn chain_changed(&self, chain_id: u64) -> Session {
        tracing::info!(chain_id, "wallet chain changed, resetting session");
        self.disconnect().await
    }

    /// Run one full read cycle for `account` and commit both snapshots.
    ///
    /// All reads are issued together and the snapshots derive from that one
    /// read set. If the session moved on while reads were in flight the
    /// results are discarded.
    pub async fn refresh(&self, account: Address) -> RefreshOutcome {
        let epoch = self.epoch.load(Ordering::SeqCst);
        {
            let mut st = self.state.write().await;
            if st.session.account != Some(account) {
                return RefreshOutcome::Discarded;
            }
            st.refreshing = true;
        }

        let (set, ico) = self.read_all(account).await;
        for (field, reason) in set.failures() {
            tracing::warn!(account = %account, field, reason, "chain read failed");
        }
        let (balances, staking) = set.into_snapshots(account, self.stable_decimals, Utc::now());

        let mut st = self.state.write().await;
        if self.epoch.load(Ordering::SeqCst) != epoch || st.session.account != Some(account) {
            tracing::debug!(account = %account, "session changed mid-refresh, discarding results");
            return RefreshOutcome::Discarded;
        }
        st.balances = Some(balances);
        st.staking = Some(staking);
        st.ico = ico;
        st.refreshing = false;
        RefreshOutcome::Committed
    }

    /// Current ICO status, independent of any session. Serves the configured
    /// fallback when the chain cannot be read.
    pub async fn ico_info(&self) -> IcoPhaseInfo {
        match self.chain.ico_status().await {
            Ok(status) => IcoPhaseInfo::from_status(&status),
            Err(e) => {
                tracing::warn!(error = %e, "ICO status read failed, serving fallback");
                self.ico_fallback.clone()
            }
        }
    }

    async fn read_all(&self, account: Address) -> (ReadSet, IcoPhaseInfo) {
        let (
            token,
            stable,
            native,
            staked,
            total_staked,
            total_supply,
            can_unstake,
            pending_rewards,
            ico,
        ) = tokio::join!(
            self.chain.token_balance(account),
            self.chain.stable_balance(account),
            self.chain.native_balance(account),
            self.chain.staked_balance(account),
            self.chain.total_staked(),
            self.chain.total_supply(),
            self.chain.can_unstake(account),
            self.chain.pending_rewards(account),
            self.chain.ico_status(),
        );

        let ico = match ico {
            Ok(status) => IcoPhaseInfo::from_status(&status),
            Err(e) => {
                tracing::warn!(error = %e, "ICO status read failed, serving fallback");
                self.ico_fallback.clone()
            }
        };

        (
            ReadSet {
                token,
                stable,
                native,
                staked,
                total_staked,
                total_supply,
                can_unstake,
                pending_rewards,
            },
            ico,
        )
    }
}
