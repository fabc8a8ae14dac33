// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Dashboard view endpoints.

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::session::{DashboardView, IcoPhaseInfo};
use crate::state::AppState;

/// Current dashboard state: session, snapshots, ICO info, refreshing flag.
///
/// A pure read; snapshots are whatever the last refresh committed.
#[utoipa::path(
    get,
    path = "/v1/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Current dashboard view", body = DashboardView)
    )
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.controller.view().await)
}

/// Re-read all balances and staking state for the connected account.
#[utoipa::path(
    post,
    path = "/v1/dashboard/refresh",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Refreshed dashboard view", body = DashboardView),
        (status = 409, description = "No wallet session")
    )
)]
pub async fn refresh_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, ApiError> {
    let account = state
        .controller
        .current_account()
        .await
        .ok_or_else(|| ApiError::conflict("no wallet session"))?;
    state.controller.refresh(account).await;
    Ok(Json(state.controller.view().await))
}

/// Public ICO phase information.
///
/// Served from the last successful chain read, or the configured fallback
/// when the contract has not been readable yet.
#[utoipa::path(
    get,
    path = "/v1/ico",
    tag = "Dashboard",
    responses(
        (status = 200, description = "ICO phase info", body = IcoPhaseInfo)
    )
)]
pub async fn get_ico(State(state): State<AppState>) -> Json<IcoPhaseInfo> {
    Json(state.controller.ico_info().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{test_app, wei};
    use alloy::primitives::Address;

    #[tokio::test]
    async fn dashboard_starts_empty_with_fallback_ico() {
        let app = test_app();
        app.chain.set(|st| st.ico = Err("rpc down".into()));

        let Json(view) = get_dashboard(State(app.state.clone())).await;
        assert!(!view.session.connected);
        assert!(view.balances.is_none());
        assert!(view.staking.is_none());

        let Json(ico) = get_ico(State(app.state.clone())).await;
        assert_eq!(ico.phase, 1);
        assert_eq!(ico.price_per_token, "0.02");
        assert_eq!(ico.tokens_remaining, "2520000");
        assert!(ico.is_fallback);
    }

    #[tokio::test]
    async fn refresh_requires_a_session() {
        let app = test_app();
        let err = refresh_dashboard(State(app.state.clone())).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn refresh_picks_up_new_chain_values() {
        let app = test_app();
        app.chain.set(|st| st.token = Ok(wei(10)));
        let account = Address::repeat_byte(0xaa);
        app.state.controller.connect(account, 137).await;

        app.chain.set(|st| st.token = Ok(wei(15)));
        let Json(view) = refresh_dashboard(State(app.state.clone())).await.unwrap();
        assert_eq!(
            view.balances.unwrap().token.formatted(),
            Some("15")
        );
    }
}
