use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::DatabaseSchema;

/// Validate internal consistency of a discovered schema.
///
/// This checks:
/// - duplicate tables/columns
/// - primary key columns exist
/// - a recorded reference only appears on foreign-key columns
///
/// A foreign-key column without a reference is allowed here; population
/// reports it for that table alone.
pub fn validate_schema(schema: &DatabaseSchema) -> Result<()> {
    let mut tables = BTreeSet::new();

    for table in &schema.tables {
        if !tables.insert(table.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {}.{}",
                schema.namespace, table.name
            )));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name: {}.{}.{}",
                    schema.namespace, table.name, column.name
                )));
            }

            if !column.is_foreign_key && column.references.is_some() {
                return Err(Error::InvalidSchema(format!(
                    "column {}.{}.{} has a reference but is not a foreign key",
                    schema.namespace, table.name, column.name
                )));
            }
        }

        for key in &table.primary_key {
            if !columns.contains(key.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "primary key column not found: {}.{}.{}",
                    schema.namespace, table.name, key
                )));
            }
        }
    }

    Ok(())
}
