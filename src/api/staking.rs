// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Staking endpoints: stake, unstake, claim, and the event history.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::orchestrator::TxOutcome;
use crate::state::AppState;
use crate::storage::StakingEvent;

use super::transactions::{session_account, HistoryQuery};

/// Request to stake or unstake CFD.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StakeRequest {
    /// CFD amount in human-readable format (e.g., "200")
    pub amount: String,
}

/// Staking event history page.
#[derive(Debug, Serialize, ToSchema)]
pub struct StakingHistoryResponse {
    /// Events, newest first
    pub events: Vec<StakingEvent>,
    /// Cursor for the next page, absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Stake CFD into the contract ledger.
#[utoipa::path(
    post,
    path = "/v1/staking/stake",
    tag = "Staking",
    request_body = StakeRequest,
    responses(
        (status = 200, description = "Transaction submitted", body = TxOutcome),
        (status = 409, description = "No session or wrong network"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn stake(
    State(state): State<AppState>,
    Json(request): Json<StakeRequest>,
) -> Result<Json<TxOutcome>, ApiError> {
    let outcome = state.orchestrator.stake(&request.amount).await?;
    Ok(Json(outcome))
}

/// Unstake previously staked CFD.
///
/// Refused locally while the staking lock has not elapsed.
#[utoipa::path(
    post,
    path = "/v1/staking/unstake",
    tag = "Staking",
    request_body = StakeRequest,
    responses(
        (status = 200, description = "Transaction submitted", body = TxOutcome),
        (status = 409, description = "No session or wrong network"),
        (status = 422, description = "Validation failed or lock active")
    )
)]
pub async fn unstake(
    State(state): State<AppState>,
    Json(request): Json<StakeRequest>,
) -> Result<Json<TxOutcome>, ApiError> {
    let outcome = state.orchestrator.unstake(&request.amount).await?;
    Ok(Json(outcome))
}

/// Claim accumulated casino-profit rewards.
#[utoipa::path(
    post,
    path = "/v1/staking/claim",
    tag = "Staking",
    responses(
        (status = 200, description = "Transaction submitted", body = TxOutcome),
        (status = 409, description = "No session or wrong network")
    )
)]
pub async fn claim(State(state): State<AppState>) -> Result<Json<TxOutcome>, ApiError> {
    let outcome = state.orchestrator.claim_rewards().await?;
    Ok(Json(outcome))
}

/// Staking event history for the connected account, newest first.
#[utoipa::path(
    get,
    path = "/v1/history/staking",
    tag = "Staking",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Staking history page", body = StakingHistoryResponse),
        (status = 409, description = "No wallet session")
    )
)]
pub async fn staking_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<StakingHistoryResponse>, ApiError> {
    let account = session_account(&state).await?;
    let (events, next_cursor) = state.history.list_staking_events(
        &account,
        query.cursor.as_deref(),
        query.effective_limit(),
    )?;
    Ok(Json(StakingHistoryResponse { events, next_cursor }))
}
