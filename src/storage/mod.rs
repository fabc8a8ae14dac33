// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! # Persistent Storage Module
//!
//! One embedded redb database holds everything the dashboard persists:
//! purchase history, staking events, admin-editable site settings, and the
//! admin action log. On-chain state is never cached here; the database only
//! records what this service itself did or was told to store.
//!
//! ## Storage Layout
//!
//! ```text
//! <DATA_DIR>/
//!   casinofound.redb     # All tables (see history.rs / settings.rs)
//!   keys/                # Per-account signing keys, managed by KeyStore
//!     {address}.pem
//! ```

pub mod history;
pub mod records;
pub mod settings;

use std::path::Path;
use std::sync::Arc;

use redb::Database;

pub use history::HistoryStore;
pub use records::{
    AdminLogEntry, PaymentMethod, SiteSettings, StakeAction, StakingEvent, TransactionRecord,
    TxStatus,
};
pub use settings::SettingsStore;

/// Database file name under the data directory.
pub const DATABASE_FILE: &str = "casinofound.redb";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Open (or create) the database and pre-create all tables so later read
/// transactions don't fail.
pub fn open_database(path: &Path) -> StoreResult<Arc<Database>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let db = Database::create(path)?;

    let write_txn = db.begin_write()?;
    {
        let _ = write_txn.open_table(history::TRANSACTIONS)?;
        let _ = write_txn.open_table(history::ACCOUNT_TX_INDEX)?;
        let _ = write_txn.open_table(history::STAKING_EVENTS)?;
        let _ = write_txn.open_table(history::ACCOUNT_STAKE_INDEX)?;
        let _ = write_txn.open_table(settings::SETTINGS)?;
        let _ = write_txn.open_table(settings::ADMIN_LOGS)?;
    }
    write_txn.commit()?;

    Ok(Arc::new(db))
}
