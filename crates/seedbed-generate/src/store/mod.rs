//! Row insertion seam between the population engine and a database.

pub mod memory;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::model::Column;

pub use memory::InMemoryStore;

/// A column as bound in an insert statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub name: String,
    /// Declared database type the text value is cast to.
    pub sql_type: String,
}

impl From<&Column> for ColumnBinding {
    fn from(column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            sql_type: column.raw_type.clone(),
        }
    }
}

/// Destination of generated rows.
///
/// Calls are awaited one at a time; implementations need not be `Send`.
#[async_trait(?Send)]
pub trait RowStore {
    /// Insert one row; `values` line up with `columns`.
    async fn insert_row(
        &mut self,
        table: &str,
        columns: &[ColumnBinding],
        values: &[String],
    ) -> Result<(), StoreError>;

    /// One existing value of `column`, chosen uniformly; `None` when the table is empty.
    async fn sample_key(&mut self, table: &str, column: &str)
    -> Result<Option<String>, StoreError>;
}
