// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    orchestrator::TxOutcome,
    session::{BalanceSnapshot, DashboardView, IcoPhaseInfo, Reading, Session, StakingSnapshot},
    state::AppState,
    storage::{
        AdminLogEntry, PaymentMethod, SiteSettings, StakeAction, StakingEvent, TransactionRecord,
        TxStatus,
    },
};

pub mod admin;
pub mod dashboard;
pub mod health;
pub mod session;
pub mod settings;
pub mod staking;
pub mod transactions;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/session/connect", post(session::connect))
        .route("/session/disconnect", post(session::disconnect))
        .route("/session/account-changed", post(session::account_changed))
        .route("/session/chain-changed", post(session::chain_changed))
        .route("/session", get(session::get_session))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/dashboard/refresh", post(dashboard::refresh_dashboard))
        .route("/ico", get(dashboard::get_ico))
        .route("/purchase", post(transactions::purchase))
        .route(
            "/transactions/{tx_hash}",
            get(transactions::transaction_status),
        )
        .route("/history/transactions", get(transactions::purchase_history))
        .route("/history/staking", get(staking::staking_history))
        .route("/staking/stake", post(staking::stake))
        .route("/staking/unstake", post(staking::unstake))
        .route("/staking/claim", post(staking::claim))
        .route("/settings", get(settings::get_settings))
        .route("/admin/access", get(admin::access))
        .route("/admin/settings", put(admin::put_settings))
        .route("/admin/settings/reset", post(admin::reset_settings))
        .route("/admin/logs", get(admin::logs))
        .route("/admin/stats", get(admin::stats));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        session::connect,
        session::disconnect,
        session::account_changed,
        session::chain_changed,
        session::get_session,
        dashboard::get_dashboard,
        dashboard::refresh_dashboard,
        dashboard::get_ico,
        transactions::purchase,
        transactions::transaction_status,
        transactions::purchase_history,
        staking::stake,
        staking::unstake,
        staking::claim,
        staking::staking_history,
        settings::get_settings,
        admin::access,
        admin::put_settings,
        admin::reset_settings,
        admin::logs,
        admin::stats
    ),
    components(
        schemas(
            Session,
            DashboardView,
            BalanceSnapshot,
            StakingSnapshot,
            IcoPhaseInfo,
            Reading,
            TxOutcome,
            TxStatus,
            PaymentMethod,
            StakeAction,
            TransactionRecord,
            StakingEvent,
            SiteSettings,
            AdminLogEntry,
            session::ConnectRequest,
            session::AccountChangedRequest,
            session::ChainChangedRequest,
            transactions::PurchaseRequest,
            transactions::TransactionStatusResponse,
            transactions::TransactionHistoryResponse,
            staking::StakeRequest,
            staking::StakingHistoryResponse,
            admin::AdminAccessResponse,
            admin::AdminLogResponse,
            admin::SystemStatsResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health probes"),
        (name = "Session", description = "Wallet session lifecycle"),
        (name = "Dashboard", description = "Balance, staking and ICO views"),
        (name = "Transactions", description = "Token purchases and status checks"),
        (name = "Staking", description = "Staking actions and history"),
        (name = "Settings", description = "Public site settings"),
        (name = "Admin", description = "Gated admin management")
    )
)]
struct ApiDoc;
