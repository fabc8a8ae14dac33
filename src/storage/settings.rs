// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Site settings and the admin action log.
//!
//! ## Table Layout
//!
//! - `site_settings`: singleton key `"current"` → serialized SiteSettings
//! - `admin_logs`: composite key (!timestamp_be|uuid) → serialized AdminLogEntry

use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::records::{AdminLogEntry, SiteSettings};
use super::StoreResult;

pub(super) const SETTINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("site_settings");

/// Key format: `inverted_timestamp_be_bytes | uuid` for newest-first scans.
pub(super) const ADMIN_LOGS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("admin_logs");

const SETTINGS_KEY: &str = "current";

fn make_log_key(entry: &AdminLogEntry) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + 16);
    key.extend_from_slice(&(!entry.created_at.timestamp_millis() as u64).to_be_bytes());
    key.extend_from_slice(entry.id.as_bytes());
    key
}

/// Store for admin-editable settings and the admin action log.
pub struct SettingsStore {
    db: Arc<Database>,
}

impl SettingsStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Current settings, or the defaults when nothing was saved yet.
    pub fn load(&self) -> StoreResult<SiteSettings> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SETTINGS)?;
        match table.get(SETTINGS_KEY)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(SiteSettings::default()),
        }
    }

    pub fn save(&self, settings: &SiteSettings) -> StoreResult<()> {
        let json = serde_json::to_vec(settings)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SETTINGS)?;
            table.insert(SETTINGS_KEY, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Reset to defaults. Returns the defaults that now apply.
    pub fn reset(&self) -> StoreResult<SiteSettings> {
        let defaults = SiteSettings::default();
        self.save(&defaults)?;
        Ok(defaults)
    }

    /// Append one admin action to the log.
    pub fn append_log(&self, entry: &AdminLogEntry) -> StoreResult<()> {
        let json = serde_json::to_vec(entry)?;
        let key = make_log_key(entry);
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ADMIN_LOGS)?;
            table.insert(key.as_slice(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Newest-first admin log entries, at most `limit`.
    pub fn list_logs(&self, limit: usize) -> StoreResult<Vec<AdminLogEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ADMIN_LOGS)?;

        let mut entries = Vec::with_capacity(limit);
        for item in table.iter()? {
            let (_, value) = item?;
            entries.push(serde_json::from_slice(value.value())?);
            if entries.len() >= limit {
                break;
            }
        }
        Ok(entries)
    }
}
