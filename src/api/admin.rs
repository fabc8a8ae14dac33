// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Admin endpoints: access check, settings management, action log, stats.
//!
//! Gated on the connected session's address matching the configured admin
//! wallet. This controls what the dashboard frontend shows; it is not
//! authentication. Deployments exposing these routes beyond a trusted
//! operator must front them with real authentication.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use alloy::primitives::Address;

use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::{AdminLogEntry, SiteSettings};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Result of the admin access check.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminAccessResponse {
    /// Whether the connected account is the admin wallet.
    pub is_admin: bool,
    /// Connected account, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Query parameters for the admin action log.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AdminLogQuery {
    /// Maximum number of entries (default 50).
    #[param(default = 50)]
    pub limit: Option<usize>,
}

/// Admin action log page, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminLogResponse {
    pub entries: Vec<AdminLogEntry>,
}

/// System statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStatsResponse {
    /// Total number of tracked purchases.
    pub total_transactions: u64,
    /// Total number of tracked staking events.
    pub total_staking_events: u64,
    /// Configured network name.
    pub network: String,
    /// Configured chain id.
    pub chain_id: u64,
    /// Current timestamp.
    pub timestamp: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// The connected account, admitted through the gate.
async fn admin_account(state: &AppState) -> Result<Address, ApiError> {
    let account = state
        .controller
        .current_account()
        .await
        .ok_or_else(|| ApiError::conflict("no wallet session"))?;
    state.gate.authorize(account)?;
    Ok(account)
}

fn log_admin_action(state: &AppState, admin: Address, action: &str, details: serde_json::Value) {
    let entry = AdminLogEntry::new(format!("{admin:#x}"), action.to_string(), details);
    if let Err(e) = state.settings.append_log(&entry) {
        tracing::warn!(action, error = %e, "failed to append admin log entry");
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Whether the connected account may see the admin area.
///
/// Never errors; a disconnected or non-admin session reports `false`.
#[utoipa::path(
    get,
    path = "/v1/admin/access",
    tag = "Admin",
    responses(
        (status = 200, description = "Access check result", body = AdminAccessResponse)
    )
)]
pub async fn access(State(state): State<AppState>) -> Json<AdminAccessResponse> {
    let account = state.controller.current_account().await;
    Json(AdminAccessResponse {
        is_admin: account.map(|a| state.gate.is_admin(a)).unwrap_or(false),
        account: account.map(|a| format!("{a:#x}")),
    })
}

/// Replace the site settings.
///
/// Appends an admin log entry with the saved values.
#[utoipa::path(
    put,
    path = "/v1/admin/settings",
    tag = "Admin",
    request_body = SiteSettings,
    responses(
        (status = 200, description = "Settings saved", body = SiteSettings),
        (status = 403, description = "Not the admin wallet"),
        (status = 409, description = "No wallet session")
    )
)]
pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<SiteSettings>,
) -> Result<Json<SiteSettings>, ApiError> {
    let admin = admin_account(&state).await?;
    state.settings.save(&settings)?;

    let details = serde_json::to_value(&settings).unwrap_or_default();
    log_admin_action(&state, admin, "update_settings", details);
    Ok(Json(settings))
}

/// Restore the default site settings.
#[utoipa::path(
    post,
    path = "/v1/admin/settings/reset",
    tag = "Admin",
    responses(
        (status = 200, description = "Settings reset", body = SiteSettings),
        (status = 403, description = "Not the admin wallet"),
        (status = 409, description = "No wallet session")
    )
)]
pub async fn reset_settings(
    State(state): State<AppState>,
) -> Result<Json<SiteSettings>, ApiError> {
    let admin = admin_account(&state).await?;
    let defaults = state.settings.reset()?;
    log_admin_action(&state, admin, "reset_settings", serde_json::json!({}));
    Ok(Json(defaults))
}

/// Admin action log, newest first.
#[utoipa::path(
    get,
    path = "/v1/admin/logs",
    tag = "Admin",
    params(AdminLogQuery),
    responses(
        (status = 200, description = "Admin action log", body = AdminLogResponse),
        (status = 403, description = "Not the admin wallet"),
        (status = 409, description = "No wallet session")
    )
)]
pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<AdminLogQuery>,
) -> Result<Json<AdminLogResponse>, ApiError> {
    admin_account(&state).await?;
    let entries = state.settings.list_logs(query.limit.unwrap_or(50))?;
    Ok(Json(AdminLogResponse { entries }))
}

/// Store counters and deployment facts.
#[utoipa::path(
    get,
    path = "/v1/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "System statistics", body = SystemStatsResponse),
        (status = 403, description = "Not the admin wallet"),
        (status = 409, description = "No wallet session")
    )
)]
pub async fn stats(State(state): State<AppState>) -> Result<Json<SystemStatsResponse>, ApiError> {
    admin_account(&state).await?;
    let (total_transactions, total_staking_events) = state.history.counts()?;
    Ok(Json(SystemStatsResponse {
        total_transactions,
        total_staking_events,
        network: state.config.network.name.to_string(),
        chain_id: state.config.network.chain_id,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::test_app;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn access_reports_false_without_a_session() {
        let app = test_app();
        let Json(response) = access(State(app.state.clone())).await;
        assert!(!response.is_admin);
        assert!(response.account.is_none());
    }

    #[tokio::test]
    async fn access_reports_true_for_the_admin_wallet() {
        let app = test_app();
        app.state.controller.connect(app.admin, 137).await;

        let Json(response) = access(State(app.state.clone())).await;
        assert!(response.is_admin);
    }

    #[tokio::test]
    async fn settings_edits_are_gated_and_logged() {
        let app = test_app();
        let visitor = Address::repeat_byte(0x01);

        // a non-admin session is refused
        app.state.controller.connect(visitor, 137).await;
        let mut edited = SiteSettings::default();
        edited.site_name = "Changed".to_string();
        let err = put_settings(State(app.state.clone()), Json(edited.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        // the admin wallet is admitted and the edit is logged
        app.state.controller.connect(app.admin, 137).await;
        let Json(saved) = put_settings(State(app.state.clone()), Json(edited))
            .await
            .unwrap();
        assert_eq!(saved.site_name, "Changed");
        assert_eq!(app.state.settings.load().unwrap().site_name, "Changed");

        let Json(log) = logs(
            State(app.state.clone()),
            Query(AdminLogQuery { limit: None }),
        )
        .await
        .unwrap();
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].action, "update_settings");
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let app = test_app();
        app.state.controller.connect(app.admin, 137).await;

        let mut edited = SiteSettings::default();
        edited.dark_mode = false;
        put_settings(State(app.state.clone()), Json(edited))
            .await
            .unwrap();

        let Json(defaults) = reset_settings(State(app.state.clone())).await.unwrap();
        assert!(defaults.dark_mode);
        assert!(app.state.settings.load().unwrap().dark_mode);
    }

    #[tokio::test]
    async fn stats_count_stored_records() {
        let app = test_app();
        app.state.controller.connect(app.admin, 137).await;

        let Json(response) = stats(State(app.state.clone())).await.unwrap();
        assert_eq!(response.total_transactions, 0);
        assert_eq!(response.total_staking_events, 0);
        assert_eq!(response.chain_id, 137);
        assert_eq!(response.network, "Polygon Mainnet");
    }

    #[tokio::test]
    async fn admin_endpoints_require_a_session() {
        let app = test_app();
        let err = stats(State(app.state.clone())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
