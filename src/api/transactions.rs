// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Token purchase endpoints and transaction status checks.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use alloy::primitives::Address;

use crate::error::ApiError;
use crate::orchestrator::{TxError, TxOutcome};
use crate::state::AppState;
use crate::storage::{PaymentMethod, StakingEvent, TransactionRecord, TxStatus};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request to buy CFD tokens.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// CFD amount to buy in human-readable format (e.g., "1000")
    pub amount: String,
    /// Payment rail: "stable" (approve + buy) or "native" (value-carrying buy)
    pub payment_method: PaymentMethod,
}

/// Stored status of a tracked transaction.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionStatusResponse {
    /// Transaction hash
    pub tx_hash: String,
    /// Record kind: "purchase" or "staking"
    pub kind: String,
    /// Status: pending, confirmed, failed
    pub status: TxStatus,
    /// Block number (if confirmed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Gas used (if confirmed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    /// Block explorer URL
    pub explorer_url: String,
    /// When the status was last updated
    pub updated_at: String,
}

impl TransactionStatusResponse {
    fn purchase(record: &TransactionRecord) -> Self {
        Self {
            tx_hash: record.tx_hash.clone(),
            kind: "purchase".to_string(),
            status: record.status,
            block_number: record.block_number,
            gas_used: record.gas_used,
            explorer_url: record.explorer_url.clone(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }

    fn staking(event: &StakingEvent) -> Self {
        Self {
            tx_hash: event.tx_hash.clone(),
            kind: "staking".to_string(),
            status: event.status,
            block_number: event.block_number,
            gas_used: event.gas_used,
            explorer_url: event.explorer_url.clone(),
            updated_at: event.updated_at.to_rfc3339(),
        }
    }
}

/// Cursor-paginated history query.
#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Opaque cursor from a previous page
    pub cursor: Option<String>,
    /// Maximum number of results (default 20, capped at 100)
    #[param(default = 20)]
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub(super) fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(20).min(100)
    }
}

/// Purchase history page.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionHistoryResponse {
    /// Purchases, newest first
    pub transactions: Vec<TransactionRecord>,
    /// Cursor for the next page, absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Connected account, as the lowercase string records are keyed by.
pub(super) async fn session_account(state: &AppState) -> Result<String, ApiError> {
    let account = state
        .controller
        .current_account()
        .await
        .ok_or_else(|| ApiError::conflict("no wallet session"))?;
    Ok(format!("{account:#x}"))
}

/// Refresh snapshots for the record's owner if they are still connected.
async fn refresh_owner(state: &AppState, account: &str) {
    if let Ok(addr) = account.parse::<Address>() {
        state.controller.refresh(addr).await;
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Buy CFD tokens with the selected payment rail.
///
/// Validates locally, submits, waits a bounded time for the receipt. A
/// response with status "pending" means the deadline passed without a
/// receipt; poll the status endpoint with the returned hash.
#[utoipa::path(
    post,
    path = "/v1/purchase",
    tag = "Transactions",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Transaction submitted", body = TxOutcome),
        (status = 409, description = "No session or wrong network"),
        (status = 422, description = "Validation failed or insufficient funds"),
        (status = 502, description = "Submission or approval failed"),
        (status = 504, description = "Approval unconfirmed at deadline")
    )
)]
pub async fn purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<TxOutcome>, ApiError> {
    let outcome = match request.payment_method {
        PaymentMethod::Stable => {
            state
                .orchestrator
                .purchase_with_stable_coin(&request.amount)
                .await?
        }
        PaymentMethod::Native => {
            state
                .orchestrator
                .purchase_with_native_coin(&request.amount)
                .await?
        }
    };
    Ok(Json(outcome))
}

/// Status of a tracked transaction.
///
/// For pending records this performs one receipt lookup and applies the
/// result, so the UI can poll after a "still pending" purchase outcome.
#[utoipa::path(
    get,
    path = "/v1/transactions/{tx_hash}",
    tag = "Transactions",
    params(
        ("tx_hash" = String, Path, description = "Transaction hash")
    ),
    responses(
        (status = 200, description = "Transaction status", body = TransactionStatusResponse),
        (status = 404, description = "Transaction not tracked")
    )
)]
pub async fn transaction_status(
    State(state): State<AppState>,
    Path(tx_hash): Path<String>,
) -> Result<Json<TransactionStatusResponse>, ApiError> {
    if let Some(record) = state.history.get_transaction(&tx_hash)? {
        let record = if record.status == TxStatus::Pending {
            match probe_receipt(&state, &tx_hash).await? {
                Some((success, block_number, gas_used)) => {
                    let updated = state
                        .history
                        .apply_transaction_receipt(&tx_hash, success, block_number, gas_used)?;
                    refresh_owner(&state, &updated.account).await;
                    updated
                }
                None => record,
            }
        } else {
            record
        };
        return Ok(Json(TransactionStatusResponse::purchase(&record)));
    }

    if let Some(event) = state.history.get_staking_event(&tx_hash)? {
        let event = if event.status == TxStatus::Pending {
            match probe_receipt(&state, &tx_hash).await? {
                Some((success, block_number, gas_used)) => {
                    let updated = state
                        .history
                        .apply_staking_receipt(&tx_hash, success, block_number, gas_used)?;
                    refresh_owner(&state, &updated.account).await;
                    updated
                }
                None => event,
            }
        } else {
            event
        };
        return Ok(Json(TransactionStatusResponse::staking(&event)));
    }

    Err(ApiError::not_found("Transaction not tracked"))
}

async fn probe_receipt(
    state: &AppState,
    tx_hash: &str,
) -> Result<Option<(bool, u64, u64)>, ApiError> {
    let receipt = state
        .orchestrator
        .probe_receipt(tx_hash)
        .await
        .map_err(TxError::Write)?;
    Ok(receipt.map(|r| (r.success, r.block_number, r.gas_used)))
}

/// Purchase history for the connected account, newest first.
#[utoipa::path(
    get,
    path = "/v1/history/transactions",
    tag = "Transactions",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Purchase history page", body = TransactionHistoryResponse),
        (status = 409, description = "No wallet session")
    )
)]
pub async fn purchase_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<TransactionHistoryResponse>, ApiError> {
    let account = session_account(&state).await?;
    let (transactions, next_cursor) = state.history.list_transactions(
        &account,
        query.cursor.as_deref(),
        query.effective_limit(),
    )?;
    Ok(Json(TransactionHistoryResponse {
        transactions,
        next_cursor,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{stable_units, test_app, wei};

    const ACCOUNT: Address = Address::repeat_byte(0xaa);

    #[tokio::test]
    async fn purchase_requires_a_session() {
        let app = test_app();
        let err = purchase(
            State(app.state.clone()),
            Json(PurchaseRequest {
                amount: "1000".to_string(),
                payment_method: PaymentMethod::Native,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn stable_purchase_round_trips_through_the_api() {
        let app = test_app();
        app.chain.set(|st| {
            st.token = Ok(wei(1000));
            st.stable = Ok(stable_units(100));
        });
        app.state.controller.connect(ACCOUNT, 137).await;

        let Json(outcome) = purchase(
            State(app.state.clone()),
            Json(PurchaseRequest {
                amount: "1000".to_string(),
                payment_method: PaymentMethod::Stable,
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.status, TxStatus::Confirmed);

        // shows up in the account's history
        let Json(page) = purchase_history(
            State(app.state.clone()),
            Query(HistoryQuery {
                cursor: None,
                limit: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(page.transactions.len(), 1);
        assert_eq!(page.transactions[0].tx_hash, outcome.tx_hash);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn below_minimum_purchase_is_unprocessable() {
        let app = test_app();
        app.chain.set(|st| st.native = Ok(wei(50)));
        app.state.controller.connect(ACCOUNT, 137).await;

        let err = purchase(
            State(app.state.clone()),
            Json(PurchaseRequest {
                amount: "50".to_string(),
                payment_method: PaymentMethod::Native,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
        assert!(app.writer.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn status_endpoint_settles_a_pending_purchase() {
        let app = test_app();
        app.chain.set(|st| st.native = Ok(wei(25)));
        app.state.controller.connect(ACCOUNT, 137).await;

        // receipts withheld: purchase comes back pending
        app.writer.set(|st| st.deliver_receipts = false);
        let Json(outcome) = purchase(
            State(app.state.clone()),
            Json(PurchaseRequest {
                amount: "1000".to_string(),
                payment_method: PaymentMethod::Native,
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.status, TxStatus::Pending);

        // receipt appears later; the status poll applies it
        app.writer.set(|st| st.deliver_receipts = true);
        let Json(status) = transaction_status(
            State(app.state.clone()),
            Path(outcome.tx_hash.clone()),
        )
        .await
        .unwrap();
        assert_eq!(status.status, TxStatus::Confirmed);
        assert_eq!(status.kind, "purchase");
        assert_eq!(status.block_number, Some(12_345));

        // applied to the stored record too
        let record = app
            .state
            .history
            .get_transaction(&outcome.tx_hash)
            .unwrap()
            .unwrap();
        assert_eq!(record.status, TxStatus::Confirmed);
    }

    #[tokio::test]
    async fn unknown_hash_is_not_found() {
        let app = test_app();
        let err = transaction_status(
            State(app.state.clone()),
            Path("0xdeadbeef".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn history_requires_a_session() {
        let app = test_app();
        let err = purchase_history(
            State(app.state.clone()),
            Query(HistoryQuery {
                cursor: None,
                limit: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);
    }
}
