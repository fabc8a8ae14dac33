// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use casinofound_server::api::router;
use casinofound_server::chain::{KeyStore, PolygonClient, TxSender};
use casinofound_server::config::{AppConfig, LogFormat};
use casinofound_server::gate::AdminGate;
use casinofound_server::orchestrator::TxOrchestrator;
use casinofound_server::session::SessionController;
use casinofound_server::state::AppState;
use casinofound_server::storage::{open_database, HistoryStore, SettingsStore, DATABASE_FILE};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Failed to load configuration");

    init_tracing(config.log_format);
    tracing::info!(
        network = config.network.name,
        chain_id = config.network.chain_id,
        "starting casinofound-server"
    );

    let db = open_database(&config.data_dir.join(DATABASE_FILE)).expect("Failed to open database");
    let history = Arc::new(HistoryStore::new(db.clone()));
    let settings = Arc::new(SettingsStore::new(db));

    let reader = PolygonClient::connect(config.network, &config.rpc_url, config.contracts)
        .expect("Failed to create chain read client");
    let keys = KeyStore::new(&config.keys_dir);
    let sender = TxSender::connect(
        config.network,
        &config.rpc_url,
        config.contracts,
        keys,
        config.receipt_poll,
    )
    .expect("Failed to create transaction sender");

    let controller = Arc::new(SessionController::new(
        Arc::new(reader),
        config.network,
        config.contracts.stable_decimals,
        config.ico_fallback(),
    ));
    let orchestrator = Arc::new(TxOrchestrator::new(
        Arc::new(sender),
        controller.clone(),
        history.clone(),
        config.rules.clone(),
        config.contracts,
        config.network,
        config.receipt_timeout,
    ));
    let gate = AdminGate::new(config.admin_wallet);

    let addr = config.bind_addr();
    let state = AppState {
        config: Arc::new(config),
        controller,
        orchestrator,
        history,
        settings,
        gate,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");
    tracing::info!("listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into());
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install shutdown handler");
    tracing::info!("shutdown signal received");
}
