use serde::{Deserialize, Serialize};

use crate::graph::DependencyNode;
use crate::types::SemanticType;

/// Schema snapshot produced by discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSchema {
    /// Database engine identifier (e.g. `postgres`).
    pub engine: String,
    /// Database name when available.
    pub database: Option<String>,
    /// Namespace the tables were discovered in.
    pub namespace: String,
    pub tables: Vec<TableSchema>,
}

impl DatabaseSchema {
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name == name)
    }
}

/// Discovered table metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnSchema>,
    /// Primary-key columns in key order.
    pub primary_key: Vec<String>,
    /// Tables holding the keys this table's foreign keys reference.
    pub depends_on: Vec<String>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.iter().any(|key| key == column)
    }
}

impl DependencyNode for TableSchema {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

/// Discovered column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    /// Type exactly as reported by the database (e.g. `character varying(50)`).
    pub raw_type: String,
    pub semantic_type: SemanticType,
    pub is_foreign_key: bool,
    /// Referenced table; expected to be set iff `is_foreign_key`.
    pub references: Option<ForeignKeyTarget>,
    /// Filled by the database (sequence default, identity or generated column).
    #[serde(default)]
    pub auto_generated: bool,
}

impl ColumnSchema {
    /// Whether inserts must supply a value for this column.
    pub fn is_insertable(&self) -> bool {
        !self.auto_generated && self.semantic_type.is_insertable()
    }
}

/// Target of a foreign-key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyTarget {
    pub table: String,
    /// Referenced column when discovery knows it.
    pub column: Option<String>,
}
