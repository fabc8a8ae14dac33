// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! ERC-20 interactions for the stable-coin payment rail.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::types::ChainReadError;

// Standard ERC-20 interface; USDT on Polygon implements this surface.
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Stable-coin contract wrapper.
pub struct StableCoinContract<P> {
    contract: IERC20::IERC20Instance<P>,
}

impl<P: Provider + Clone> StableCoinContract<P> {
    /// Create a new contract instance at the deployed address.
    pub fn new(provider: &P, address: Address) -> Self {
        Self {
            contract: IERC20::new(address, provider.clone()),
        }
    }

    /// Stable-coin balance of an account.
    pub async fn balance_of(&self, account: Address) -> Result<U256, ChainReadError> {
        self.contract
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| ChainReadError::Contract(e.to_string()))
    }
}
