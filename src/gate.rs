// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Admin access gate for the dashboard.
//!
//! A single wallet address, set at deployment, unlocks the admin endpoints.
//! Comparison is case-insensitive by construction: both sides are parsed
//! `Address` values, so checksum casing in the connected wallet never
//! matters.
//!
//! WARNING: this gates endpoint *visibility* for the dashboard frontend,
//! nothing more. The check runs against a client-reported address and is
//! not authentication. Deployments exposing the admin routes beyond a
//! trusted network must front them with real authentication.

use alloy::primitives::Address;

/// Attempted admin action from a non-admin account.
#[derive(Debug, thiserror::Error)]
#[error("account {account} is not the admin wallet")]
pub struct AdminAccessError {
    pub account: Address,
}

/// Holds the configured admin wallet and answers membership checks.
#[derive(Debug, Clone, Copy)]
pub struct AdminGate {
    admin: Address,
}

impl AdminGate {
    pub fn new(admin: Address) -> Self {
        Self { admin }
    }

    /// Whether the account is the admin wallet.
    pub fn is_admin(&self, account: Address) -> bool {
        account == self.admin
    }

    /// Admit the account or report who was refused.
    pub fn authorize(&self, account: Address) -> Result<(), AdminAccessError> {
        if self.is_admin(account) {
            Ok(())
        } else {
            Err(AdminAccessError { account })
        }
    }
}
