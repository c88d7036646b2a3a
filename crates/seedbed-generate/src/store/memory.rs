use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use tracing::info;

use crate::errors::{GenerationError, StoreError};
use crate::model::Table;
use crate::output::csv::write_table_csv;
use crate::rng::RandomSource;
use crate::store::{ColumnBinding, RowStore};

/// Row store kept in memory, used for dry runs and tests.
///
/// Primary-key and auto-generated columns receive sequential values per
/// table, like a database sequence would.
#[derive(Debug)]
pub struct InMemoryStore {
    rng: RandomSource,
    tables: BTreeMap<String, MemoryTable>,
}

#[derive(Debug)]
struct MemoryTable {
    columns: Vec<String>,
    sequence_columns: Vec<String>,
    next_id: u64,
    rows: Vec<BTreeMap<String, String>>,
}

impl InMemoryStore {
    pub fn new(rng: RandomSource) -> Self {
        Self {
            rng,
            tables: BTreeMap::new(),
        }
    }

    /// Create a store with every table registered.
    pub fn for_tables(tables: &[Table], rng: RandomSource) -> Self {
        let mut store = Self::new(rng);
        for table in tables {
            store.register(table);
        }
        store
    }

    pub fn register(&mut self, table: &Table) {
        let sequence_columns = table
            .columns
            .iter()
            .filter(|column| column.auto_generated || table.is_primary_key(&column.name))
            .map(|column| column.name.clone())
            .collect();
        self.tables.insert(
            table.name.clone(),
            MemoryTable {
                columns: table.columns.iter().map(|column| column.name.clone()).collect(),
                sequence_columns,
                next_id: 1,
                rows: Vec::new(),
            },
        );
    }

    /// Stored rows of a table, keyed by column name.
    pub fn rows(&self, table: &str) -> &[BTreeMap<String, String>] {
        self.tables
            .get(table)
            .map(|table| table.rows.as_slice())
            .unwrap_or_default()
    }

    /// Write every table as `<table>.csv` under `dir`.
    pub fn write_csv(&self, dir: &Path) -> Result<Vec<PathBuf>, GenerationError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.tables.len());
        for (name, table) in &self.tables {
            let path = dir.join(format!("{name}.csv"));
            let bytes = write_table_csv(&path, &table.columns, &table.rows)?;
            info!(
                event = "csv_written",
                table = %name,
                rows = table.rows.len(),
                bytes,
                path = %path.display(),
                "table exported"
            );
            written.push(path);
        }
        Ok(written)
    }
}

#[async_trait(?Send)]
impl RowStore for InMemoryStore {
    async fn insert_row(
        &mut self,
        table: &str,
        columns: &[ColumnBinding],
        values: &[String],
    ) -> Result<(), StoreError> {
        let stored = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        if columns.len() != values.len() {
            return Err(StoreError::Rejected(format!(
                "{} columns but {} values",
                columns.len(),
                values.len()
            )));
        }

        let mut row = BTreeMap::new();
        for (binding, value) in columns.iter().zip(values) {
            if !stored.columns.contains(&binding.name) {
                return Err(StoreError::Rejected(format!(
                    "column {} does not exist in {table}",
                    binding.name
                )));
            }
            row.insert(binding.name.clone(), value.clone());
        }

        let id = stored.next_id;
        for column in &stored.sequence_columns {
            row.entry(column.clone()).or_insert_with(|| id.to_string());
        }
        stored.next_id += 1;
        stored.rows.push(row);
        Ok(())
    }

    async fn sample_key(
        &mut self,
        table: &str,
        column: &str,
    ) -> Result<Option<String>, StoreError> {
        let stored = self
            .tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        if !stored.columns.iter().any(|name| name == column) {
            return Err(StoreError::Query(format!(
                "column {column} does not exist in {table}"
            )));
        }

        let candidates: Vec<&String> = stored
            .rows
            .iter()
            .filter_map(|row| row.get(column))
            .collect();
        Ok(self
            .rng
            .with(|rng| candidates.choose(rng).map(|value| (*value).clone())))
    }
}
