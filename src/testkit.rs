// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Shared test doubles for the chain seams.
//!
//! [`MockChain`] and [`MockWriter`] are programmable stand-ins for the RPC
//! layer so session and orchestrator behavior can be tested without a node.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::chain::{
    ChainReadError, ChainReader, ChainWriteError, ChainWriter, ContractAddresses, IcoStatus,
    TxReceipt, POLYGON_MAINNET,
};
use crate::config::{AppConfig, LogFormat, PurchaseRules};
use crate::gate::AdminGate;
use crate::orchestrator::TxOrchestrator;
use crate::session::{IcoPhaseInfo, SessionController};
use crate::state::AppState;
use crate::storage::{open_database, HistoryStore, SettingsStore};

/// `n` whole tokens in 18-decimal base units.
pub fn wei(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

/// `n` whole stable-coin units at 6 decimals.
pub fn stable_units(n: u64) -> U256 {
    U256::from(n) * U256::from(1_000_000u64)
}

pub fn fallback_ico() -> IcoPhaseInfo {
    IcoPhaseInfo {
        phase: 1,
        price_per_token: "0.02".to_string(),
        tokens_remaining: "2520000".to_string(),
        is_fallback: true,
    }
}

pub fn test_contracts() -> ContractAddresses {
    ContractAddresses {
        token: Address::repeat_byte(0xc0),
        stable_coin: Address::repeat_byte(0xc1),
        stable_decimals: 6,
    }
}

/// Programmable read results, one slot per [`ChainReader`] method.
pub struct MockState {
    pub chain_id: Result<u64, String>,
    pub token: Result<U256, String>,
    pub stable: Result<U256, String>,
    pub native: Result<U256, String>,
    pub staked: Result<U256, String>,
    pub total_staked: Result<U256, String>,
    pub total_supply: Result<U256, String>,
    pub can_unstake: Result<bool, String>,
    pub pending_rewards: Result<U256, String>,
    pub ico: Result<IcoStatus, String>,
    /// Applied to every read, for in-flight race tests.
    pub delay: Option<Duration>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            chain_id: Ok(137),
            token: Ok(U256::ZERO),
            stable: Ok(U256::ZERO),
            native: Ok(U256::ZERO),
            staked: Ok(U256::ZERO),
            total_staked: Ok(U256::ZERO),
            total_supply: Ok(U256::ZERO),
            can_unstake: Ok(false),
            pending_rewards: Ok(U256::ZERO),
            ico: Ok(IcoStatus {
                phase: 1,
                price: U256::from(20_000_000_000_000_000u64), // 0.02
                tokens_remaining: wei(2_520_000),
            }),
            delay: None,
        }
    }
}

#[derive(Default)]
pub struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn set(&self, update: impl FnOnce(&mut MockState)) {
        update(&mut self.state.lock().unwrap());
    }

    async fn read<T>(&self, pick: impl FnOnce(&MockState) -> Result<T, String>) -> Result<T, ChainReadError> {
        let (value, delay) = {
            let st = self.state.lock().unwrap();
            (pick(&st), st.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        value.map_err(ChainReadError::Rpc)
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn chain_id(&self) -> Result<u64, ChainReadError> {
        self.read(|st| st.chain_id.clone()).await
    }

    async fn native_balance(&self, _account: Address) -> Result<U256, ChainReadError> {
        self.read(|st| st.native.clone()).await
    }

    async fn token_balance(&self, _account: Address) -> Result<U256, ChainReadError> {
        self.read(|st| st.token.clone()).await
    }

    async fn stable_balance(&self, _account: Address) -> Result<U256, ChainReadError> {
        self.read(|st| st.stable.clone()).await
    }

    async fn staked_balance(&self, _account: Address) -> Result<U256, ChainReadError> {
        self.read(|st| st.staked.clone()).await
    }

    async fn total_staked(&self) -> Result<U256, ChainReadError> {
        self.read(|st| st.total_staked.clone()).await
    }

    async fn total_supply(&self) -> Result<U256, ChainReadError> {
        self.read(|st| st.total_supply.clone()).await
    }

    async fn can_unstake(&self, _account: Address) -> Result<bool, ChainReadError> {
        self.read(|st| st.can_unstake.clone()).await
    }

    async fn pending_rewards(&self, _account: Address) -> Result<U256, ChainReadError> {
        self.read(|st| st.pending_rewards.clone()).await
    }

    async fn ico_status(&self) -> Result<IcoStatus, ChainReadError> {
        self.read(|st| st.ico.clone()).await
    }
}

/// One recorded transaction submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Approve {
        from: Address,
        spender: Address,
        amount: U256,
    },
    Buy {
        from: Address,
        token_amount: U256,
        payment_token: Address,
        native_value: Option<U256>,
    },
    Stake {
        from: Address,
        amount: U256,
    },
    Unstake {
        from: Address,
        amount: U256,
    },
    Claim {
        from: Address,
    },
}

pub struct WriterState {
    pub submissions: Vec<Submission>,
    /// Error returned by the next submission, consumed once.
    pub fail_next: Option<ChainWriteError>,
    /// When true every submitted transaction has a receipt available
    /// immediately; when false receipts never appear (pending forever).
    pub deliver_receipts: bool,
    /// Success flag stamped on synthesized receipts.
    pub receipt_success: bool,
    /// Per-hash overrides, checked before synthesis.
    pub receipts: HashMap<String, TxReceipt>,
    hashes: Vec<String>,
}

impl Default for WriterState {
    fn default() -> Self {
        Self {
            submissions: Vec::new(),
            fail_next: None,
            deliver_receipts: true,
            receipt_success: true,
            receipts: HashMap::new(),
            hashes: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct MockWriter {
    state: Mutex<WriterState>,
}

impl MockWriter {
    pub fn set(&self, update: impl FnOnce(&mut WriterState)) {
        update(&mut self.state.lock().unwrap());
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// Hash the n-th submission produced, counting from zero.
    pub fn hash_for(n: usize) -> String {
        format!("0x{:064x}", n)
    }

    fn submit(&self, submission: Submission) -> Result<String, ChainWriteError> {
        let mut st = self.state.lock().unwrap();
        if let Some(err) = st.fail_next.take() {
            return Err(err);
        }
        let hash = Self::hash_for(st.hashes.len());
        st.hashes.push(hash.clone());
        st.submissions.push(submission);
        Ok(hash)
    }
}

#[async_trait]
impl ChainWriter for MockWriter {
    async fn approve_stable(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<String, ChainWriteError> {
        self.submit(Submission::Approve {
            from,
            spender,
            amount,
        })
    }

    async fn buy_tokens(
        &self,
        from: Address,
        token_amount: U256,
        payment_token: Address,
        native_value: Option<U256>,
    ) -> Result<String, ChainWriteError> {
        self.submit(Submission::Buy {
            from,
            token_amount,
            payment_token,
            native_value,
        })
    }

    async fn stake(&self, from: Address, amount: U256) -> Result<String, ChainWriteError> {
        self.submit(Submission::Stake { from, amount })
    }

    async fn unstake(&self, from: Address, amount: U256) -> Result<String, ChainWriteError> {
        self.submit(Submission::Unstake { from, amount })
    }

    async fn claim_rewards(&self, from: Address) -> Result<String, ChainWriteError> {
        self.submit(Submission::Claim { from })
    }

    async fn receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, ChainWriteError> {
        let st = self.state.lock().unwrap();
        if let Some(receipt) = st.receipts.get(tx_hash) {
            return Ok(Some(receipt.clone()));
        }
        if st.deliver_receipts && st.hashes.iter().any(|h| h == tx_hash) {
            return Ok(Some(TxReceipt {
                tx_hash: tx_hash.to_string(),
                block_number: 12_345,
                gas_used: 84_000,
                success: st.receipt_success,
            }));
        }
        Ok(None)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(5)
    }
}

/// A fully wired [`AppState`] over the mocks, for handler tests.
pub struct TestApp {
    pub state: AppState,
    pub chain: Arc<MockChain>,
    pub writer: Arc<MockWriter>,
    pub admin: Address,
    _dir: tempfile::TempDir,
}

pub fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let admin = Address::repeat_byte(0xad);

    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_dir: dir.path().to_path_buf(),
        keys_dir: dir.path().join("keys"),
        network: POLYGON_MAINNET,
        rpc_url: POLYGON_MAINNET.rpc_url.to_string(),
        contracts: test_contracts(),
        admin_wallet: admin,
        rules: PurchaseRules::default(),
        receipt_timeout: Duration::from_millis(100),
        receipt_poll: Duration::from_millis(5),
        log_format: LogFormat::Pretty,
    };

    let db = open_database(&dir.path().join("test.redb")).unwrap();
    let history = Arc::new(HistoryStore::new(db.clone()));
    let settings = Arc::new(SettingsStore::new(db));

    let chain = Arc::new(MockChain::default());
    let writer = Arc::new(MockWriter::default());
    let controller = Arc::new(SessionController::new(
        chain.clone(),
        config.network,
        config.contracts.stable_decimals,
        config.ico_fallback(),
    ));
    let orchestrator = Arc::new(TxOrchestrator::new(
        writer.clone(),
        controller.clone(),
        history.clone(),
        config.rules.clone(),
        config.contracts,
        config.network,
        config.receipt_timeout,
    ));
    let gate = AdminGate::new(config.admin_wallet);

    let state = AppState {
        config: Arc::new(config),
        controller,
        orchestrator,
        history,
        settings,
        gate,
    };

    TestApp {
        state,
        chain,
        writer,
        admin,
        _dir: dir,
    }
}
