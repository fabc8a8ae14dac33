// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AppConfig`] struct loaded from the environment at startup. Configuration
//! is read once; there is no dynamic reconfiguration.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for the transaction database | `/data` |
//! | `KEYS_DIR` | Directory holding per-account signing keys (PEM) | `<DATA_DIR>/keys` |
//! | `CHAIN_ID` | Polygon chain id (137 mainnet, 80002 Amoy) | `137` |
//! | `RPC_URL` | JSON-RPC endpoint | Public RPC of the chain |
//! | `CFD_TOKEN_ADDRESS` | CFD token contract address | Required |
//! | `USDT_ADDRESS` | Stable-coin contract address | Required |
//! | `STABLE_COIN_DECIMALS` | Stable-coin decimal places | `6` |
//! | `ADMIN_WALLET` | Address granted the admin panel | Required |
//! | `MIN_PURCHASE_TOKENS` | Minimum CFD purchase, whole tokens | `100` |
//! | `MAX_PURCHASE_TOKENS` | Maximum CFD purchase, whole tokens | `100000` |
//! | `MIN_STAKE_TOKENS` | Minimum CFD stake, whole tokens | `100` |
//! | `RECEIPT_TIMEOUT_SECS` | How long to wait for a transaction receipt | `60` |
//! | `RECEIPT_POLL_SECS` | Interval between receipt polls | `2` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::{Address, U256};

use crate::chain::{
    network_for_chain, parse_amount, ContractAddresses, NetworkConfig, TOKEN_DECIMALS,
};
use crate::session::IcoPhaseInfo;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// The transaction history database and, unless `KEYS_DIR` overrides it,
/// the signing keys live under this directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const KEYS_DIR_ENV: &str = "KEYS_DIR";

pub const CHAIN_ID_ENV: &str = "CHAIN_ID";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CFD_TOKEN_ADDRESS_ENV: &str = "CFD_TOKEN_ADDRESS";
pub const USDT_ADDRESS_ENV: &str = "USDT_ADDRESS";
pub const STABLE_COIN_DECIMALS_ENV: &str = "STABLE_COIN_DECIMALS";
pub const ADMIN_WALLET_ENV: &str = "ADMIN_WALLET";

pub const MIN_PURCHASE_ENV: &str = "MIN_PURCHASE_TOKENS";
pub const MAX_PURCHASE_ENV: &str = "MAX_PURCHASE_TOKENS";
pub const MIN_STAKE_ENV: &str = "MIN_STAKE_TOKENS";

pub const RECEIPT_TIMEOUT_ENV: &str = "RECEIPT_TIMEOUT_SECS";
pub const RECEIPT_POLL_ENV: &str = "RECEIPT_POLL_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// ICO status served when the chain read fails.
pub const DEFAULT_ICO_PHASE: u64 = 1;
pub const DEFAULT_ICO_PRICE: &str = "0.02";
pub const DEFAULT_ICO_TOKENS_REMAINING: &str = "2520000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Guard rails applied to one ICO phase before any chain call is made.
#[derive(Debug, Clone)]
pub struct PhaseRule {
    pub phase: u64,
    /// Display price for the phase, in native-coin units. The live price
    /// still comes from the contract.
    pub price_per_token: String,
    /// Minimum CFD purchase in base units.
    pub min_purchase: U256,
    /// Maximum CFD purchase in base units.
    pub max_purchase: U256,
}

/// Table of per-phase purchase rules plus the staking minimum.
#[derive(Debug, Clone)]
pub struct PurchaseRules {
    phases: Vec<PhaseRule>,
    fallback: PhaseRule,
    /// Minimum CFD stake in base units.
    pub min_stake: U256,
}

impl PurchaseRules {
    pub fn new(phases: Vec<PhaseRule>, min_stake: U256) -> Self {
        let fallback = phases.first().cloned().unwrap_or_else(|| PhaseRule {
            phase: DEFAULT_ICO_PHASE,
            price_per_token: DEFAULT_ICO_PRICE.to_string(),
            min_purchase: whole_tokens(100),
            max_purchase: whole_tokens(100_000),
        });
        Self {
            phases,
            fallback,
            min_stake,
        }
    }

    /// Rule for `phase`, falling back to the first configured phase when the
    /// contract reports one the table does not know.
    pub fn rule_for(&self, phase: u64) -> &PhaseRule {
        self.phases
            .iter()
            .find(|r| r.phase == phase)
            .unwrap_or(&self.fallback)
    }
}

impl Default for PurchaseRules {
    fn default() -> Self {
        Self::new(
            vec![
                PhaseRule {
                    phase: 1,
                    price_per_token: "0.02".to_string(),
                    min_purchase: whole_tokens(100),
                    max_purchase: whole_tokens(100_000),
                },
                PhaseRule {
                    phase: 2,
                    price_per_token: "0.10".to_string(),
                    min_purchase: whole_tokens(100),
                    max_purchase: whole_tokens(100_000),
                },
            ],
            whole_tokens(100),
        )
    }
}

fn whole_tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(TOKEN_DECIMALS as u64))
}

/// Process-wide read-only configuration, loaded once at startup and passed
/// to constructors explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub keys_dir: PathBuf,
    pub network: NetworkConfig,
    pub rpc_url: String,
    pub contracts: ContractAddresses,
    pub admin_wallet: Address,
    pub rules: PurchaseRules,
    pub receipt_timeout: Duration,
    pub receipt_poll: Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Tests supply a map.
    pub fn from_lookup(
        get: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let host = get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&get, PORT_ENV, 8080u16)?;

        let chain_id = parse_or(&get, CHAIN_ID_ENV, 137u64)?;
        let network = network_for_chain(chain_id).ok_or_else(|| ConfigError::InvalidVar {
            name: CHAIN_ID_ENV,
            reason: format!("unsupported chain id {chain_id}"),
        })?;
        let rpc_url = get(RPC_URL_ENV).unwrap_or_else(|| network.rpc_url.to_string());

        let contracts = ContractAddresses {
            token: required_address(&get, CFD_TOKEN_ADDRESS_ENV)?,
            stable_coin: required_address(&get, USDT_ADDRESS_ENV)?,
            stable_decimals: parse_or(&get, STABLE_COIN_DECIMALS_ENV, 6u8)?,
        };
        let admin_wallet = required_address(&get, ADMIN_WALLET_ENV)?;

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| "/data".to_string()));
        let keys_dir = match get(KEYS_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => data_dir.join("keys"),
        };

        let defaults = PurchaseRules::default();
        let min_purchase = amount_or(&get, MIN_PURCHASE_ENV, whole_tokens(100))?;
        let max_purchase = amount_or(&get, MAX_PURCHASE_ENV, whole_tokens(100_000))?;
        let min_stake = amount_or(&get, MIN_STAKE_ENV, whole_tokens(100))?;
        let phases = defaults
            .phases
            .into_iter()
            .map(|rule| PhaseRule {
                min_purchase,
                max_purchase,
                ..rule
            })
            .collect();
        let rules = PurchaseRules::new(phases, min_stake);

        let receipt_timeout = Duration::from_secs(parse_or(&get, RECEIPT_TIMEOUT_ENV, 60u64)?);
        let receipt_poll = Duration::from_secs(parse_or(&get, RECEIPT_POLL_ENV, 2u64)?);

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            keys_dir,
            network,
            rpc_url,
            contracts,
            admin_wallet,
            rules,
            receipt_timeout,
            receipt_poll,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// ICO status served when the chain cannot be read.
    pub fn ico_fallback(&self) -> IcoPhaseInfo {
        IcoPhaseInfo {
            phase: DEFAULT_ICO_PHASE,
            price_per_token: DEFAULT_ICO_PRICE.to_string(),
            tokens_remaining: DEFAULT_ICO_TOKENS_REMAINING.to_string(),
            is_fallback: true,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&'static str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            name,
            reason: e.to_string(),
        }),
    }
}

fn required_address(
    get: &impl Fn(&'static str) -> Option<String>,
    name: &'static str,
) -> Result<Address, ConfigError> {
    let raw = get(name).ok_or(ConfigError::MissingVar(name))?;
    raw.parse().map_err(|_| ConfigError::InvalidVar {
        name,
        reason: format!("not a valid address: {raw}"),
    })
}

/// Whole-token amount variable, converted to base units.
fn amount_or(
    get: &impl Fn(&'static str) -> Option<String>,
    name: &'static str,
    default: U256,
) -> Result<U256, ConfigError> {
    match get(name) {
        None => Ok(default),
        Some(raw) => {
            parse_amount(&raw, TOKEN_DECIMALS).map_err(|e| ConfigError::InvalidVar {
                name,
                reason: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert(
            CFD_TOKEN_ADDRESS_ENV,
            "0x1234567890123456789012345678901234567890".to_string(),
        );
        vars.insert(
            USDT_ADDRESS_ENV,
            "0xc2132D05D31c914a87C6611C10748AEb04B58e8F".to_string(),
        );
        vars.insert(
            ADMIN_WALLET_ENV,
            "0x5555555555555555555555555555555555555555".to_string(),
        );
        vars
    }

    fn load(vars: HashMap<&'static str, String>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_fill_everything_but_addresses() {
        let config = load(base_vars()).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.network.chain_id, 137);
        assert_eq!(config.rpc_url, "https://polygon-rpc.com");
        assert_eq!(config.contracts.stable_decimals, 6);
        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.keys_dir, PathBuf::from("/data/keys"));
        assert_eq!(config.receipt_timeout, Duration::from_secs(60));
        assert_eq!(config.receipt_poll, Duration::from_secs(2));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn missing_token_address_is_an_error() {
        let mut vars = base_vars();
        vars.remove(CFD_TOKEN_ADDRESS_ENV);
        assert!(matches!(
            load(vars),
            Err(ConfigError::MissingVar(CFD_TOKEN_ADDRESS_ENV))
        ));
    }

    #[test]
    fn malformed_address_is_rejected() {
        let mut vars = base_vars();
        vars.insert(ADMIN_WALLET_ENV, "not-an-address".to_string());
        assert!(matches!(load(vars), Err(ConfigError::InvalidVar { .. })));
    }

    #[test]
    fn unsupported_chain_id_is_rejected() {
        let mut vars = base_vars();
        vars.insert(CHAIN_ID_ENV, "1".to_string());
        assert!(matches!(
            load(vars),
            Err(ConfigError::InvalidVar { name: CHAIN_ID_ENV, .. })
        ));
    }

    #[test]
    fn amoy_chain_uses_its_own_rpc_default() {
        let mut vars = base_vars();
        vars.insert(CHAIN_ID_ENV, "80002".to_string());
        let config = load(vars).unwrap();
        assert_eq!(config.network.chain_id, 80002);
        assert_eq!(config.rpc_url, "https://rpc-amoy.polygon.technology");
    }

    #[test]
    fn purchase_limits_come_from_the_environment() {
        let mut vars = base_vars();
        vars.insert(MIN_PURCHASE_ENV, "250".to_string());
        vars.insert(MIN_STAKE_ENV, "50".to_string());
        let config = load(vars).unwrap();

        let rule = config.rules.rule_for(1);
        assert_eq!(rule.min_purchase, whole_tokens(250));
        assert_eq!(config.rules.min_stake, whole_tokens(50));
    }

    #[test]
    fn unknown_phase_falls_back_to_first_rule() {
        let rules = PurchaseRules::default();
        let rule = rules.rule_for(99);
        assert_eq!(rule.phase, 1);
        assert_eq!(rule.price_per_token, "0.02");
    }

    #[test]
    fn phase_table_prices_differ() {
        let rules = PurchaseRules::default();
        assert_eq!(rules.rule_for(1).price_per_token, "0.02");
        assert_eq!(rules.rule_for(2).price_per_token, "0.10");
    }

    #[test]
    fn ico_fallback_matches_defaults() {
        let config = load(base_vars()).unwrap();
        let info = config.ico_fallback();
        assert_eq!(info.phase, 1);
        assert_eq!(info.price_per_token, "0.02");
        assert_eq!(info.tokens_remaining, "2520000");
        assert!(info.is_fallback);
    }
}
