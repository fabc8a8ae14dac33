// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

//! Purchase and staking history backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `transactions`: tx_hash → serialized TransactionRecord
//! - `account_tx_index`: composite key (address|!timestamp|tx_hash) → ()
//! - `staking_events`: tx_hash → serialized StakingEvent
//! - `account_stake_index`: composite key (address|!timestamp|tx_hash) → ()

use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};

use super::records::{StakingEvent, TransactionRecord};
use super::{StoreError, StoreResult};

/// Primary table: tx_hash → serialized TransactionRecord (JSON bytes).
pub(super) const TRANSACTIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("transactions");

/// Index: composite key (address|!timestamp_be|tx_hash) for descending-time
/// range scans per account.
pub(super) const ACCOUNT_TX_INDEX: TableDefinition<&[u8], ()> =
    TableDefinition::new("account_tx_index");

/// Primary table: tx_hash → serialized StakingEvent (JSON bytes).
pub(super) const STAKING_EVENTS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("staking_events");

pub(super) const ACCOUNT_STAKE_INDEX: TableDefinition<&[u8], ()> =
    TableDefinition::new("account_stake_index");

/// Build a composite key for an account index table.
///
/// Format: `lowercase_address | inverted_timestamp_be_bytes | tx_hash`
///
/// The inverted timestamp ensures newest-first ordering when scanning forward.
fn make_index_key(account: &str, timestamp: i64, tx_hash: &str) -> Vec<u8> {
    let addr = account.to_lowercase();
    let mut key = Vec::with_capacity(addr.len() + 1 + 8 + 1 + tx_hash.len());
    key.extend_from_slice(addr.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&(!timestamp as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(tx_hash.as_bytes());
    key
}

/// Build a prefix for range scanning all entries of one account.
fn make_prefix(account: &str) -> Vec<u8> {
    let addr = account.to_lowercase();
    let mut prefix = Vec::with_capacity(addr.len() + 1);
    prefix.extend_from_slice(addr.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Upper bound for a range scan (prefix with 0xFF bytes appended).
fn make_prefix_end(account: &str) -> Vec<u8> {
    let mut end = make_prefix(account);
    end.extend_from_slice(&[0xFF; 20]);
    end
}

fn encode_cursor(key: &[u8]) -> String {
    alloy::hex::encode(key)
}

fn decode_cursor(cursor: &str) -> Option<Vec<u8>> {
    alloy::hex::decode(cursor).ok()
}

fn extract_tx_hash_from_key(key: &[u8]) -> Option<String> {
    let mut pipe_count = 0;
    for (i, &b) in key.iter().enumerate() {
        if b == b'|' {
            pipe_count += 1;
            if pipe_count == 2 {
                return String::from_utf8(key[i + 1..].to_vec()).ok();
            }
        }
    }
    None
}

/// Embedded history store for purchases and staking events.
pub struct HistoryStore {
    db: Arc<Database>,
}

impl HistoryStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert or update a purchase record and its index entry.
    pub fn record_transaction(&self, record: &TransactionRecord) -> StoreResult<()> {
        let json = serde_json::to_vec(record)?;
        let timestamp = record.created_at.timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut tx_table = write_txn.open_table(TRANSACTIONS)?;
            tx_table.insert(record.tx_hash.as_str(), json.as_slice())?;

            let mut idx_table = write_txn.open_table(ACCOUNT_TX_INDEX)?;
            let key = make_index_key(&record.account, timestamp, &record.tx_hash);
            idx_table.insert(key.as_slice(), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a single purchase by hash.
    pub fn get_transaction(&self, tx_hash: &str) -> StoreResult<Option<TransactionRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSACTIONS)?;
        match table.get(tx_hash)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Apply a receipt outcome to a stored purchase.
    pub fn apply_transaction_receipt(
        &self,
        tx_hash: &str,
        success: bool,
        block_number: u64,
        gas_used: u64,
    ) -> StoreResult<TransactionRecord> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut table = write_txn.open_table(TRANSACTIONS)?;

            let existing_bytes = {
                let existing = table
                    .get(tx_hash)?
                    .ok_or_else(|| StoreError::NotFound(format!("transaction {tx_hash}")))?;
                existing.value().to_vec()
            };

            let mut record: TransactionRecord = serde_json::from_slice(&existing_bytes)?;
            record.apply_receipt(success, block_number, gas_used);

            let json = serde_json::to_vec(&record)?;
            table.insert(tx_hash, json.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// Paginated newest-first listing of one account's purchases.
    ///
    /// Returns `(records, next_cursor)`.
    pub fn list_transactions(
        &self,
        account: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> StoreResult<(Vec<TransactionRecord>, Option<String>)> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(ACCOUNT_TX_INDEX)?;
        let tx_table = read_txn.open_table(TRANSACTIONS)?;

        let mut results = Vec::with_capacity(limit);
        let next_cursor = scan_index(&idx_table, account, cursor, limit, |tx_hash| {
            match tx_table.get(tx_hash)? {
                Some(value) => {
                    results.push(serde_json::from_slice(value.value())?);
                    Ok(true)
                }
                None => Ok(false),
            }
        })?;

        Ok((results, next_cursor))
    }

    /// Insert or update a staking event and its index entry.
    pub fn record_staking_event(&self, event: &StakingEvent) -> StoreResult<()> {
        let json = serde_json::to_vec(event)?;
        let timestamp = event.created_at.timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut ev_table = write_txn.open_table(STAKING_EVENTS)?;
            ev_table.insert(event.tx_hash.as_str(), json.as_slice())?;

            let mut idx_table = write_txn.open_table(ACCOUNT_STAKE_INDEX)?;
            let key = make_index_key(&event.account, timestamp, &event.tx_hash);
            idx_table.insert(key.as_slice(), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_staking_event(&self, tx_hash: &str) -> StoreResult<Option<StakingEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STAKING_EVENTS)?;
        match table.get(tx_hash)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Apply a receipt outcome to a stored staking event.
    pub fn apply_staking_receipt(
        &self,
        tx_hash: &str,
        success: bool,
        block_number: u64,
        gas_used: u64,
    ) -> StoreResult<StakingEvent> {
        let write_txn = self.db.begin_write()?;
        let event = {
            let mut table = write_txn.open_table(STAKING_EVENTS)?;

            let existing_bytes = {
                let existing = table
                    .get(tx_hash)?
                    .ok_or_else(|| StoreError::NotFound(format!("staking event {tx_hash}")))?;
                existing.value().to_vec()
            };

            let mut event: StakingEvent = serde_json::from_slice(&existing_bytes)?;
            event.apply_receipt(success, block_number, gas_used);

            let json = serde_json::to_vec(&event)?;
            table.insert(tx_hash, json.as_slice())?;
            event
        };
        write_txn.commit()?;
        Ok(event)
    }

    /// Paginated newest-first listing of one account's staking events.
    pub fn list_staking_events(
        &self,
        account: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> StoreResult<(Vec<StakingEvent>, Option<String>)> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(ACCOUNT_STAKE_INDEX)?;
        let ev_table = read_txn.open_table(STAKING_EVENTS)?;

        let mut results = Vec::with_capacity(limit);
        let next_cursor = scan_index(&idx_table, account, cursor, limit, |tx_hash| {
            match ev_table.get(tx_hash)? {
                Some(value) => {
                    results.push(serde_json::from_slice(value.value())?);
                    Ok(true)
                }
                None => Ok(false),
            }
        })?;

        Ok((results, next_cursor))
    }

    /// Row counts for the admin dashboard.
    pub fn counts(&self) -> StoreResult<(u64, u64)> {
        let read_txn = self.db.begin_read()?;
        let transactions = read_txn.open_table(TRANSACTIONS)?.len()?;
        let staking_events = read_txn.open_table(STAKING_EVENTS)?.len()?;
        Ok((transactions, staking_events))
    }
}

/// Shared index scan: walks one account's composite-key range newest first,
/// calling `visit` per tx_hash until `limit` entries were accepted.
fn scan_index<T: ReadableTable<&'static [u8], ()>>(
    idx_table: &T,
    account: &str,
    cursor: Option<&str>,
    limit: usize,
    mut visit: impl FnMut(&str) -> StoreResult<bool>,
) -> StoreResult<Option<String>> {
    let prefix = make_prefix(account);
    let prefix_end = make_prefix_end(account);

    let start: Vec<u8> = match cursor {
        Some(cursor_str) => decode_cursor(cursor_str).unwrap_or_else(|| prefix.clone()),
        None => prefix.clone(),
    };

    let range = idx_table.range(start.as_slice()..prefix_end.as_slice())?;

    let mut skip_first = cursor.is_some();
    let mut accepted = 0usize;
    let mut last_key: Option<Vec<u8>> = None;

    for entry in range {
        let entry = entry?;
        let key_bytes = entry.0.value().to_vec();

        // Skip the cursor entry itself
        if skip_first {
            skip_first = false;
            continue;
        }

        if let Some(tx_hash) = extract_tx_hash_from_key(&key_bytes) {
            if visit(&tx_hash)? {
                accepted += 1;
                last_key = Some(key_bytes);
            }
        }

        if accepted >= limit {
            break;
        }
    }

    if accepted >= limit {
        Ok(last_key.map(|k| encode_cursor(&k)))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::open_database;
    use crate::storage::records::{PaymentMethod, StakeAction, TxStatus};
    use chrono::Utc;

    fn temp_store() -> (HistoryStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = open_database(&dir.path().join("test.redb")).unwrap();
        (HistoryStore::new(db), dir)
    }

    const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";

    fn sample_purchase(hash: &str) -> TransactionRecord {
        TransactionRecord::new_pending(
            hash.to_string(),
            ACCOUNT.to_string(),
            "1000".to_string(),
            PaymentMethod::Stable,
            "20".to_string(),
            format!("https://polygonscan.com/tx/{hash}"),
        )
    }

    #[test]
    fn record_and_get_purchase() {
        let (store, _dir) = temp_store();
        store.record_transaction(&sample_purchase("0xaaa")).unwrap();

        let retrieved = store.get_transaction("0xaaa").unwrap().unwrap();
        assert_eq!(retrieved.tx_hash, "0xaaa");
        assert_eq!(retrieved.token_amount, "1000");
        assert_eq!(retrieved.status, TxStatus::Pending);
    }

    #[test]
    fn receipt_updates_stored_record() {
        let (store, _dir) = temp_store();
        store.record_transaction(&sample_purchase("0xbbb")).unwrap();

        let updated = store
            .apply_transaction_receipt("0xbbb", true, 12_345, 84_000)
            .unwrap();
        assert_eq!(updated.status, TxStatus::Confirmed);
        assert_eq!(updated.block_number, Some(12_345));

        let reverted = store
            .apply_transaction_receipt("0xbbb", false, 12_346, 30_000)
            .unwrap();
        assert_eq!(reverted.status, TxStatus::Failed);
    }

    #[test]
    fn receipt_for_unknown_hash_is_not_found() {
        let (store, _dir) = temp_store();
        assert!(matches!(
            store.apply_transaction_receipt("0xmissing", true, 1, 1),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn purchases_paginate_newest_first() {
        let (store, _dir) = temp_store();

        for i in 0..5 {
            let mut record = sample_purchase(&format!("0x{i:04}"));
            record.created_at = Utc::now() - chrono::Duration::seconds(5 - i);
            store.record_transaction(&record).unwrap();
        }

        let (page1, cursor) = store.list_transactions(ACCOUNT, None, 2).unwrap();
        assert_eq!(page1.len(), 2);
        // newest (largest i, latest created_at) comes first
        assert_eq!(page1[0].tx_hash, "0x0004");
        assert!(cursor.is_some());

        let (page2, cursor2) = store
            .list_transactions(ACCOUNT, cursor.as_deref(), 2)
            .unwrap();
        assert_eq!(page2.len(), 2);

        let (page3, cursor3) = store
            .list_transactions(ACCOUNT, cursor2.as_deref(), 2)
            .unwrap();
        assert_eq!(page3.len(), 1);
        assert!(cursor3.is_none());
    }

    #[test]
    fn listing_is_scoped_to_the_account() {
        let (store, _dir) = temp_store();
        store.record_transaction(&sample_purchase("0xaaa")).unwrap();

        let other = "0x2222222222222222222222222222222222222222";
        let (records, _) = store.list_transactions(other, None, 10).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn account_lookup_is_case_insensitive() {
        let (store, _dir) = temp_store();
        store.record_transaction(&sample_purchase("0xaaa")).unwrap();

        let upper = ACCOUNT.to_uppercase().replace("0X", "0x");
        let (records, _) = store.list_transactions(&upper, None, 10).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn staking_events_round_trip() {
        let (store, _dir) = temp_store();
        let event = StakingEvent::new_pending(
            "0xccc".to_string(),
            ACCOUNT.to_string(),
            StakeAction::Stake,
            Some("200".to_string()),
            String::new(),
        );
        store.record_staking_event(&event).unwrap();

        let updated = store
            .apply_staking_receipt("0xccc", true, 99, 50_000)
            .unwrap();
        assert_eq!(updated.status, TxStatus::Confirmed);

        let (events, _) = store.list_staking_events(ACCOUNT, None, 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, StakeAction::Stake);
    }

    #[test]
    fn counts_cover_both_tables() {
        let (store, _dir) = temp_store();
        store.record_transaction(&sample_purchase("0xaaa")).unwrap();
        store.record_transaction(&sample_purchase("0xbbb")).unwrap();
        store
            .record_staking_event(&StakingEvent::new_pending(
                "0xccc".to_string(),
                ACCOUNT.to_string(),
                StakeAction::Claim,
                None,
                String::new(),
            ))
            .unwrap();

        assert_eq!(store.counts().unwrap(), (2, 1));
    }

    #[test]
    fn make_index_key_orders_newest_first() {
        let key_old = make_index_key("0xaddr", 1000, "0xtx1");
        let key_new = make_index_key("0xaddr", 2000, "0xtx2");
        assert!(key_new < key_old, "newer timestamps should sort first");
    }
}
