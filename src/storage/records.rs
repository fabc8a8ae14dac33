// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Persistent record types: purchase history, staking events, site settings,
//! and the admin action log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Submitted but not yet confirmed
    Pending,
    /// Confirmed in a block
    Confirmed,
    /// Reverted on chain
    Failed,
}

impl Default for TxStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Payment rail used for a token purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Stable-coin purchase (approve, then buy)
    Stable,
    /// Native-coin purchase (payment carried as call value)
    Native,
}

/// Stored record of one token purchase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionRecord {
    /// Transaction hash (0x prefixed)
    pub tx_hash: String,
    /// Buyer address, stored lowercase
    pub account: String,
    /// CFD amount purchased, human-readable
    pub token_amount: String,
    pub payment_method: PaymentMethod,
    /// Amount paid, in the payment asset's units
    pub payment_amount: String,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    /// Block explorer URL
    pub explorer_url: String,
    /// When the transaction was submitted
    pub created_at: DateTime<Utc>,
    /// When the status was last updated
    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a new pending purchase record.
    pub fn new_pending(
        tx_hash: String,
        account: String,
        token_amount: String,
        payment_method: PaymentMethod,
        payment_amount: String,
        explorer_url: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            tx_hash,
            account: account.to_lowercase(),
            token_amount,
            payment_method,
            payment_amount,
            status: TxStatus::Pending,
            block_number: None,
            gas_used: None,
            explorer_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a receipt outcome.
    pub fn apply_receipt(&mut self, success: bool, block_number: u64, gas_used: u64) {
        self.status = if success {
            TxStatus::Confirmed
        } else {
            TxStatus::Failed
        };
        self.block_number = Some(block_number);
        self.gas_used = Some(gas_used);
        self.updated_at = Utc::now();
    }
}

/// Staking ledger operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StakeAction {
    Stake,
    Unstake,
    Claim,
}

/// Stored record of one staking-ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StakingEvent {
    /// Transaction hash (0x prefixed)
    pub tx_hash: String,
    /// Account address, stored lowercase
    pub account: String,
    pub action: StakeAction,
    /// CFD amount, absent for reward claims
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    pub explorer_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StakingEvent {
    pub fn new_pending(
        tx_hash: String,
        account: String,
        action: StakeAction,
        amount: Option<String>,
        explorer_url: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            tx_hash,
            account: account.to_lowercase(),
            action,
            amount,
            status: TxStatus::Pending,
            block_number: None,
            gas_used: None,
            explorer_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_receipt(&mut self, success: bool, block_number: u64, gas_used: u64) {
        self.status = if success {
            TxStatus::Confirmed
        } else {
            TxStatus::Failed
        };
        self.block_number = Some(block_number);
        self.gas_used = Some(gas_used);
        self.updated_at = Utc::now();
    }
}

/// Admin-editable site branding and copy.
///
/// These are display values only; contract addresses and validation rules
/// are startup configuration and cannot be edited here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_description: String,
    /// ISO-8601 local datetime shown by the launch countdown
    pub casino_launch_date: String,
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub dark_mode: bool,
    pub primary_color: String,
    pub accent_color: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "CasinoFound".to_string(),
            site_description: "CFD token on Polygon funding an online casino".to_string(),
            casino_launch_date: "2026-01-01T00:00:00".to_string(),
            default_language: "pt".to_string(),
            supported_languages: vec![
                "pt".to_string(),
                "en".to_string(),
                "fr".to_string(),
                "zh".to_string(),
            ],
            dark_mode: true,
            primary_color: "#FFD700".to_string(),
            accent_color: "#00FFC8".to_string(),
        }
    }
}

/// One admin panel action, kept for auditability.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminLogEntry {
    pub id: Uuid,
    /// Admin address, stored lowercase
    pub admin: String,
    /// Short action name, e.g. `settings.update`
    pub action: String,
    /// Action-specific payload
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AdminLogEntry {
    pub fn new(admin: String, action: String, details: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            admin: admin.to_lowercase(),
            action,
            details,
            created_at: Utc::now(),
        }
    }
}
