// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Wallet session lifecycle endpoints.
//!
//! The dashboard frontend relays wallet-provider events here: connect,
//! disconnect, and the provider's account/chain change notifications. The
//! service tracks a single session; a new connect replaces the old one.

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use alloy::primitives::Address;

use crate::error::ApiError;
use crate::session::{DashboardView, Session};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Request to start a wallet session.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConnectRequest {
    /// Connected account address (0x + 40 hex chars)
    pub account: String,
    /// Chain id the wallet reports being on
    pub chain_id: u64,
}

/// Wallet-provider account change notification.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AccountChangedRequest {
    /// New account, absent when the wallet disconnected entirely
    #[serde(default)]
    pub account: Option<String>,
}

/// Wallet-provider chain change notification.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChainChangedRequest {
    /// Chain id the wallet switched to
    pub chain_id: u64,
}

/// Validate and parse a wallet address presented by the frontend.
fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Address must be 0x followed by 40 hex characters"))
}

// =============================================================================
// Handlers
// =============================================================================

/// Start a session for a connected wallet.
///
/// Runs a full snapshot refresh before responding.
#[utoipa::path(
    post,
    path = "/v1/session/connect",
    tag = "Session",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Session started, dashboard refreshed", body = DashboardView),
        (status = 400, description = "Invalid address")
    )
)]
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<DashboardView>, ApiError> {
    let account = parse_address(&request.account)?;
    let view = state.controller.connect(account, request.chain_id).await;
    Ok(Json(view))
}

/// End the current session.
///
/// Idempotent: disconnecting with no session is a no-op.
#[utoipa::path(
    post,
    path = "/v1/session/disconnect",
    tag = "Session",
    responses(
        (status = 200, description = "Session cleared", body = Session)
    )
)]
pub async fn disconnect(State(state): State<AppState>) -> Json<Session> {
    Json(state.controller.disconnect().await)
}

/// Relay a wallet-provider account change.
///
/// A new account replaces the session and refreshes; an absent account is
/// a full disconnect.
#[utoipa::path(
    post,
    path = "/v1/session/account-changed",
    tag = "Session",
    request_body = AccountChangedRequest,
    responses(
        (status = 200, description = "Session updated", body = DashboardView),
        (status = 400, description = "Invalid address")
    )
)]
pub async fn account_changed(
    State(state): State<AppState>,
    Json(request): Json<AccountChangedRequest>,
) -> Result<Json<DashboardView>, ApiError> {
    let account = match request.account.as_deref() {
        Some(raw) => Some(parse_address(raw)?),
        None => None,
    };
    let view = state.controller.account_changed(account).await;
    Ok(Json(view))
}

/// Relay a wallet-provider chain change. Always a full disconnect.
#[utoipa::path(
    post,
    path = "/v1/session/chain-changed",
    tag = "Session",
    request_body = ChainChangedRequest,
    responses(
        (status = 200, description = "Session cleared", body = Session)
    )
)]
pub async fn chain_changed(
    State(state): State<AppState>,
    Json(request): Json<ChainChangedRequest>,
) -> Json<Session> {
    Json(state.controller.chain_changed(request.chain_id).await)
}

/// Current session state.
#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    responses(
        (status = 200, description = "Current session", body = Session)
    )
)]
pub async fn get_session(State(state): State<AppState>) -> Json<Session> {
    Json(state.controller.session().await)
}
