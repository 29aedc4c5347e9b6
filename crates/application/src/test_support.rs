use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Mutex;

use rolegrid_core::StoreError;
use rolegrid_domain::{Identity, UserId};

use crate::store_ports::{Filter, Row, StoreAdapter, StoreResult, Table, UserDirectory};

/// Store fake with switchable atomic replace and injectable insert failures.
#[derive(Default)]
pub(crate) struct FakeStore {
    tables: Mutex<HashMap<Table, Vec<Row>>>,
    next_id: AtomicU64,
    pub(crate) atomic_replace: AtomicBool,
    pub(crate) failing_inserts: AtomicUsize,
    pub(crate) failing_lists: AtomicBool,
    pub(crate) lists_fail_after_insert_failure: AtomicBool,
    pub(crate) failing_deletes: AtomicBool,
    pub(crate) inserts_lose_acknowledgement: AtomicBool,
}

impl FakeStore {
    pub(crate) fn atomic() -> Self {
        let store = Self::default();
        store.atomic_replace.store(true, Ordering::SeqCst);
        store
    }

    pub(crate) async fn rows(&self, table: Table) -> Vec<Row> {
        self.tables
            .lock()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    fn prepare(&self, table: Table, mut row: Row) -> Row {
        if table.has_generated_identity() {
            let sequence = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            row.insert("id".to_owned(), Value::from(format!("{}-{sequence}", table.as_str())));
            let created_at = Utc
                .timestamp_opt(1_700_000_000 + i64::try_from(sequence).unwrap_or_default(), 0)
                .single()
                .unwrap_or_else(Utc::now);
            row.insert("created_at".to_owned(), Value::from(created_at.to_rfc3339()));
        }
        row
    }

    fn violates_unique(table: Table, existing: &[Row], candidate: &Row) -> bool {
        table.unique_keys().iter().any(|columns| {
            existing.iter().any(|row| {
                columns
                    .iter()
                    .all(|column| row.get(*column) == candidate.get(*column))
            })
        })
    }
}

#[async_trait]
impl StoreAdapter for FakeStore {
    async fn list(&self, table: Table, filter: &Filter) -> StoreResult<Vec<Row>> {
        if self.failing_lists.load(Ordering::SeqCst) {
            return Err(StoreError::transport("list unavailable"));
        }

        Ok(self
            .rows(table)
            .await
            .into_iter()
            .filter(|row| filter.matches(row))
            .collect())
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        if self
            .failing_inserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            if self.lists_fail_after_insert_failure.load(Ordering::SeqCst) {
                self.failing_lists.store(true, Ordering::SeqCst);
            }
            return Err(StoreError::transport("connection reset during insert"));
        }

        let mut tables = self.tables.lock().await;
        let stored = tables.entry(table).or_default();
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let row = self.prepare(table, row);
            if Self::violates_unique(table, stored, &row)
                || Self::violates_unique(table, &inserted, &row)
            {
                return Err(StoreError::constraint(format!(
                    "duplicate key in '{}'",
                    table.as_str()
                )));
            }
            inserted.push(row);
        }
        stored.extend(inserted.iter().cloned());
        if self.inserts_lose_acknowledgement.load(Ordering::SeqCst) {
            return Err(StoreError::transport("timed out waiting for insert acknowledgement"));
        }
        Ok(inserted)
    }

    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> StoreResult<Vec<Row>> {
        let mut tables = self.tables.lock().await;
        let stored = tables.entry(table).or_default();
        let mut updated = Vec::new();
        for row in stored.iter_mut().filter(|row| filter.matches(row)) {
            for (column, value) in &patch {
                row.insert(column.clone(), value.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, filter: &Filter) -> StoreResult<u64> {
        if self.failing_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::transport("delete unavailable"));
        }

        let mut tables = self.tables.lock().await;
        let stored = tables.entry(table).or_default();
        let before = stored.len();
        stored.retain(|row| !filter.matches(row));
        Ok(u64::try_from(before - stored.len()).unwrap_or_default())
    }

    async fn replace(
        &self,
        table: Table,
        filter: &Filter,
        rows: Vec<Row>,
    ) -> StoreResult<Option<Vec<Row>>> {
        if !self.atomic_replace.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let mut tables = self.tables.lock().await;
        let stored = tables.entry(table).or_default();
        stored.retain(|row| !filter.matches(row));
        let inserted: Vec<Row> = rows.into_iter().map(|row| self.prepare(table, row)).collect();
        stored.extend(inserted.iter().cloned());
        Ok(Some(inserted))
    }
}

/// Directory fake returning a fixed identity list.
pub(crate) struct FakeDirectory {
    identities: Vec<Identity>,
}

impl FakeDirectory {
    pub(crate) fn with_users(user_ids: &[&str]) -> Self {
        Self {
            identities: user_ids
                .iter()
                .map(|user_id| Identity {
                    id: UserId::new(*user_id),
                    email: Some(format!("{user_id}@example.test")),
                    created_at: Utc::now(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn list_identities(&self) -> StoreResult<Vec<Identity>> {
        Ok(self.identities.clone())
    }
}
