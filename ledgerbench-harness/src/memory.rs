//! In-process stand-in for the ledger, used by `--in-memory` dry runs.
//!
//! Indexed tables answer lookups from hash maps; unindexed tables scan every
//! row, so a with/without-index comparison shows a real difference.

use async_trait::async_trait;
use ledgerbench_client::{sql::INDEXED_COLUMNS, IndexSetup};
use ledgerbench_common::{LedgerError, Lookup, Result, Transfer};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::store::DataStore;

#[derive(Default)]
struct Table {
    rows: Vec<Transfer>,
    indexed: bool,
    by_hash: HashMap<String, usize>,
    by_from: HashMap<String, Vec<usize>>,
    by_to: HashMap<String, Vec<usize>>,
    by_block: HashMap<u64, Vec<usize>>,
}

impl Table {
    fn insert(&mut self, record: Transfer) {
        let pos = self.rows.len();
        if self.indexed {
            self.by_hash.insert(record.transaction_hash.clone(), pos);
            self.by_from.entry(record.from.clone()).or_default().push(pos);
            self.by_to.entry(record.to.clone()).or_default().push(pos);
            self.by_block.entry(record.block_number).or_default().push(pos);
        }
        self.rows.push(record);
    }

    fn positions(&self, lookup: &Lookup) -> Vec<usize> {
        if self.indexed {
            return match lookup {
                Lookup::Hash(h) => self.by_hash.get(h).into_iter().copied().collect(),
                Lookup::From(a) => self.by_from.get(a).cloned().unwrap_or_default(),
                Lookup::To(a) => self.by_to.get(a).cloned().unwrap_or_default(),
                Lookup::Block(b) => self.by_block.get(b).cloned().unwrap_or_default(),
            };
        }
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches(row, lookup))
            .map(|(pos, _)| pos)
            .collect()
    }
}

fn matches(row: &Transfer, lookup: &Lookup) -> bool {
    match lookup {
        Lookup::Hash(h) => &row.transaction_hash == h,
        Lookup::From(a) => &row.from == a,
        Lookup::To(a) => &row.to == a,
        Lookup::Block(b) => row.block_number == *b,
    }
}

/// A single history table held in memory. `None` means the table is dropped.
#[derive(Default)]
pub struct MemoryStore {
    table: Mutex<Option<Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn missing() -> LedgerError {
        LedgerError::NotFound("table does not exist".to_string())
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn create_table(&self, with_indexes: bool) -> Result<IndexSetup> {
        let mut guard = self.table.lock();
        let table = guard.get_or_insert_with(Table::default);
        if !with_indexes {
            return Ok(IndexSetup::NotRequested);
        }
        if !table.rows.is_empty() {
            return Ok(IndexSetup::SkippedNonEmpty { rows: table.rows.len() as u64 });
        }
        table.indexed = true;
        Ok(IndexSetup::Created { ready: INDEXED_COLUMNS.len(), failed: Vec::new() })
    }

    async fn remove_table(&self) -> Result<()> {
        *self.table.lock() = None;
        Ok(())
    }

    async fn insert_batch(&self, records: &[Transfer]) -> Result<()> {
        let mut guard = self.table.lock();
        let table = guard.as_mut().ok_or_else(Self::missing)?;
        for record in records {
            table.insert(record.clone());
        }
        Ok(())
    }

    async fn query_by_exact_match(&self, lookup: &Lookup) -> Result<Vec<Transfer>> {
        let guard = self.table.lock();
        let table = guard.as_ref().ok_or_else(Self::missing)?;
        Ok(table
            .positions(lookup)
            .into_iter()
            .map(|pos| table.rows[pos].clone())
            .collect())
    }

    async fn count_matching(&self, lookup: &Lookup) -> Result<u64> {
        let guard = self.table.lock();
        let table = guard.as_ref().ok_or_else(Self::missing)?;
        Ok(table.positions(lookup).len() as u64)
    }

    async fn count_all(&self) -> Result<u64> {
        let guard = self.table.lock();
        let table = guard.as_ref().ok_or_else(Self::missing)?;
        Ok(table.rows.len() as u64)
    }

    async fn last_record(&self) -> Result<Option<(u64, Transfer)>> {
        let guard = self.table.lock();
        let table = guard.as_ref().ok_or_else(Self::missing)?;
        // Ids start at 1, like the ledger's AUTO_INCREMENT.
        Ok(table.rows.last().map(|row| (table.rows.len() as u64, row.clone())))
    }
}
