use serde::{Deserialize, Serialize};

use seedbed_core::{
    ColumnSchema, DependencyNode, ForeignKeyTarget, MissingDependency, MissingDependencyPolicy,
    SemanticType, TableSchema,
};

use crate::generators::{GeneratorFn, GeneratorRegistry};

/// Options for the population engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulateOptions {
    /// Handling of dependencies on tables outside the discovered set.
    pub missing_dependencies: MissingDependencyPolicy,
}

/// A column ready for generation.
#[derive(Debug)]
pub struct Column {
    pub name: String,
    /// Type as declared in the database, used to cast inserted text.
    pub raw_type: String,
    pub semantic_type: SemanticType,
    pub is_foreign_key: bool,
    pub references: Option<ForeignKeyTarget>,
    pub auto_generated: bool,
    pub generator: GeneratorFn,
}

impl Column {
    pub fn from_schema(column: &ColumnSchema, registry: &GeneratorRegistry) -> Self {
        Self {
            name: column.name.clone(),
            raw_type: column.raw_type.clone(),
            semantic_type: column.semantic_type,
            is_foreign_key: column.is_foreign_key,
            references: column.references.clone(),
            auto_generated: column.auto_generated,
            generator: registry.default_generator(column.semantic_type),
        }
    }

    /// Whether inserts must supply a value for this column.
    pub fn is_insertable(&self) -> bool {
        !self.auto_generated && self.semantic_type.is_insertable()
    }
}

/// A table with attached generators and a target row count.
#[derive(Debug)]
pub struct Table {
    pub name: String,
    /// Columns in declaration order; names are unique.
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub depends_on: Vec<String>,
    /// Rows to insert; 0 skips the table.
    pub rows: u64,
}

impl Table {
    /// Build a table with default generators and no rows requested.
    pub fn from_schema(table: &TableSchema, registry: &GeneratorRegistry) -> Self {
        Self {
            name: table.name.clone(),
            columns: table
                .columns
                .iter()
                .map(|column| Column::from_schema(column, registry))
                .collect(),
            primary_key: table.primary_key.clone(),
            depends_on: table.depends_on.clone(),
            rows: 0,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.iter().any(|key| key == column)
    }

    /// Columns supplied explicitly on insert: insertable and outside the primary key.
    pub fn insert_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|column| column.is_insertable() && !self.is_primary_key(&column.name))
    }
}

impl DependencyNode for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

/// Final state of a table's population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    Completed,
    /// No rows were requested.
    Skipped,
    /// Population stopped early; rows inserted before the failure are kept.
    Aborted { reason: String },
}

/// Summary of a populated table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows_requested: u64,
    pub rows_inserted: u64,
    pub rows_failed: u64,
    #[serde(flatten)]
    pub status: TableStatus,
}

impl TableReport {
    pub fn new(table: &str, rows_requested: u64) -> Self {
        Self {
            table: table.to_string(),
            rows_requested,
            rows_inserted: 0,
            rows_failed: 0,
            status: TableStatus::Completed,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.status, TableStatus::Aborted { .. })
    }
}

/// Report for a population run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationReport {
    /// Tables in the order they were processed.
    pub order: Vec<String>,
    pub missing_dependencies: Vec<MissingDependency>,
    pub tables: Vec<TableReport>,
}

impl PopulationReport {
    pub fn rows_inserted(&self) -> u64 {
        self.tables.iter().map(|table| table.rows_inserted).sum()
    }

    pub fn rows_failed(&self) -> u64 {
        self.tables.iter().map(|table| table.rows_failed).sum()
    }

    pub fn aborted_tables(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|table| table.is_aborted())
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.table == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_report_serializes_status_inline() {
        let mut report = TableReport::new("orders", 10);
        report.rows_inserted = 3;
        report.status = TableStatus::Aborted {
            reason: "no rows".to_string(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "table": "orders",
                "rows_requested": 10,
                "rows_inserted": 3,
                "rows_failed": 0,
                "status": "aborted",
                "reason": "no rows",
            })
        );
    }
}
