// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Read-only Polygon client.

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use async_trait::async_trait;

use super::erc20::StableCoinContract;
use super::token::CfdTokenContract;
use super::types::*;
use super::ChainReader;

/// HTTP provider type for Polygon (with all fillers).
pub(crate) type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Polygon read client backing the dashboard's view calls.
pub struct PolygonClient {
    /// Network configuration
    network: NetworkConfig,
    /// Deployed contract addresses
    contracts: ContractAddresses,
    /// Alloy HTTP provider
    provider: HttpProvider,
}

impl PolygonClient {
    /// Connect a read client to an RPC endpoint.
    pub fn connect(
        network: NetworkConfig,
        rpc_url: &str,
        contracts: ContractAddresses,
    ) -> Result<Self, ChainReadError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainReadError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            network,
            contracts,
            provider,
        })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Get the current block number. Used by the readiness probe.
    pub async fn block_number(&self) -> Result<u64, ChainReadError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainReadError::Rpc(e.to_string()))
    }

    fn token(&self) -> CfdTokenContract<HttpProvider> {
        CfdTokenContract::new(&self.provider, self.contracts.token)
    }

    fn stable_coin(&self) -> StableCoinContract<HttpProvider> {
        StableCoinContract::new(&self.provider, self.contracts.stable_coin)
    }
}

#[async_trait]
impl ChainReader for PolygonClient {
    async fn chain_id(&self) -> Result<u64, ChainReadError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ChainReadError::Rpc(e.to_string()))
    }

    async fn native_balance(&self, account: Address) -> Result<U256, ChainReadError> {
        self.provider
            .get_balance(account)
            .await
            .map_err(|e| ChainReadError::Rpc(e.to_string()))
    }

    async fn token_balance(&self, account: Address) -> Result<U256, ChainReadError> {
        self.token().balance_of(account).await
    }

    async fn stable_balance(&self, account: Address) -> Result<U256, ChainReadError> {
        self.stable_coin().balance_of(account).await
    }

    async fn staked_balance(&self, account: Address) -> Result<U256, ChainReadError> {
        self.token().staked_balance(account).await
    }

    async fn total_staked(&self) -> Result<U256, ChainReadError> {
        self.token().total_staked().await
    }

    async fn total_supply(&self) -> Result<U256, ChainReadError> {
        self.token().total_supply().await
    }

    async fn can_unstake(&self, account: Address) -> Result<bool, ChainReadError> {
        self.token().can_unstake(account).await
    }

    async fn pending_rewards(&self, account: Address) -> Result<U256, ChainReadError> {
        self.token().pending_rewards(account).await
    }

    async fn ico_status(&self) -> Result<IcoStatus, ChainReadError> {
        self.token().ico_status().await
    }
}
