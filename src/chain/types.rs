// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Chain types, network constants, and the read/write error taxonomy.

use alloy::primitives::{Address, U256};

/// Polygon network configuration.
#[derive(Debug, Clone, Copy)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

impl NetworkConfig {
    /// Explorer URL for a transaction hash.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}

/// Polygon PoS Mainnet configuration.
pub const POLYGON_MAINNET: NetworkConfig = NetworkConfig {
    name: "Polygon Mainnet",
    chain_id: 137,
    rpc_url: "https://polygon-rpc.com",
    explorer_url: "https://polygonscan.com",
};

/// Polygon Amoy Testnet configuration.
pub const POLYGON_AMOY: NetworkConfig = NetworkConfig {
    name: "Polygon Amoy Testnet",
    chain_id: 80002,
    rpc_url: "https://rpc-amoy.polygon.technology",
    explorer_url: "https://amoy.polygonscan.com",
};

/// Resolve a network configuration from a chain id.
pub fn network_for_chain(chain_id: u64) -> Option<NetworkConfig> {
    match chain_id {
        137 => Some(POLYGON_MAINNET),
        80002 => Some(POLYGON_AMOY),
        _ => None,
    }
}

/// Decimals of the CFD token (standard 18).
pub const TOKEN_DECIMALS: u8 = 18;
/// Decimals of the native coin (MATIC/POL).
pub const NATIVE_DECIMALS: u8 = 18;

/// Deployed contract addresses consumed by the adapter.
///
/// The contracts themselves are external: only their addresses and method
/// surface are configuration here.
#[derive(Debug, Clone, Copy)]
pub struct ContractAddresses {
    /// CFD token contract (sale, staking, and reward ledger in one).
    pub token: Address,
    /// Stable-coin contract used as the purchase payment rail.
    pub stable_coin: Address,
    /// Decimals of the stable coin (USDT on Polygon uses 6).
    pub stable_decimals: u8,
}

/// Raw ICO sale status as read from the token contract.
#[derive(Debug, Clone, Copy)]
pub struct IcoStatus {
    /// Current sale phase number.
    pub phase: u64,
    /// Price per token in native-coin wei.
    pub price: U256,
    /// Tokens remaining in the current phase, in token units.
    pub tokens_remaining: U256,
}

/// Transaction receipt after inclusion in a block.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: String,
    /// Block number where the transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether the transaction succeeded (false = reverted)
    pub success: bool,
}

/// Errors from read-only chain calls.
///
/// A failed read means the value is unknown, never zero; callers must not
/// substitute a default silently.
#[derive(Debug, thiserror::Error)]
pub enum ChainReadError {
    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("contract call failed: {0}")]
    Contract(String),
}

/// The connected chain does not match the network this service is configured
/// for. Writes are blocked until the wallet provider switches networks.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("wrong network: connected to chain {actual}, expected chain {expected}")]
pub struct NetworkMismatchError {
    pub expected: u64,
    pub actual: u64,
}

/// Errors from transaction submission and receipt retrieval.
#[derive(Debug, thiserror::Error)]
pub enum ChainWriteError {
    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("signing key unavailable: {0}")]
    Signer(String),

    #[error(transparent)]
    NetworkMismatch(#[from] NetworkMismatchError),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_lookup_covers_both_polygon_chains() {
        assert_eq!(network_for_chain(137).map(|n| n.name), Some("Polygon Mainnet"));
        assert_eq!(
            network_for_chain(80002).map(|n| n.name),
            Some("Polygon Amoy Testnet")
        );
        assert!(network_for_chain(43114).is_none());
    }

    #[test]
    fn explorer_tx_url_joins_hash() {
        let url = POLYGON_MAINNET.explorer_tx_url("0xabc");
        assert_eq!(url, "https://polygonscan.com/tx/0xabc");
    }

    #[test]
    fn network_mismatch_message_names_both_chains() {
        let err = NetworkMismatchError {
            expected: 137,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "wrong network: connected to chain 1, expected chain 137"
        );
    }
}
