// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! CasinoFound Dashboard Service
//!
//! Backend for the CasinoFound (CFD) token-holder dashboard: wallet session
//! state, on-chain balance and staking aggregation, and ICO purchase /
//! staking transaction submission on Polygon PoS.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `chain` - Polygon RPC access, contract bindings, signing
//! - `session` - Wallet session state and dashboard snapshots
//! - `orchestrator` - Purchase and staking transaction flows
//! - `gate` - Admin wallet gate
//! - `storage` - Embedded history and settings store (redb)

pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod session;
pub mod state;
pub mod storage;

#[cfg(test)]
pub mod testkit;
