// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

use std::sync::Arc;

use crate::config::AppConfig;
use crate::gate::AdminGate;
use crate::orchestrator::TxOrchestrator;
use crate::session::SessionController;
use crate::storage::{HistoryStore, SettingsStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub controller: Arc<SessionController>,
    pub orchestrator: Arc<TxOrchestrator>,
    pub history: Arc<HistoryStore>,
    pub settings: Arc<SettingsStore>,
    pub gate: AdminGate,
}
