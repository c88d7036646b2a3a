use crate::errors::GenerationError;
use crate::model::{Column, Table};

/// Where a foreign-key column draws its values from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceKey {
    pub table: String,
    pub column: String,
}

/// Resolve the referenced key of a foreign-key column.
///
/// Uses the referenced column recorded by discovery, else the first
/// primary-key column of the referenced table.
pub fn resolve_reference(
    table: &Table,
    column: &Column,
    tables: &[Table],
) -> Result<ReferenceKey, GenerationError> {
    let target = column
        .references
        .as_ref()
        .filter(|target| !target.table.is_empty())
        .ok_or_else(|| GenerationError::MissingReferenceTable {
            table: table.name.clone(),
            column: column.name.clone(),
        })?;

    let key_column = match &target.column {
        Some(key) => Some(key.clone()),
        None => tables
            .iter()
            .find(|candidate| candidate.name == target.table)
            .and_then(|referenced| referenced.primary_key.first().cloned()),
    };

    let column_name = key_column.ok_or_else(|| GenerationError::MissingReferenceKey {
        table: table.name.clone(),
        column: column.name.clone(),
        referenced: target.table.clone(),
    })?;

    Ok(ReferenceKey {
        table: target.table.clone(),
        column: column_name,
    })
}

#[cfg(test)]
mod tests {
    use seedbed_core::{ColumnSchema, ForeignKeyTarget, SemanticType, TableSchema};

    use super::*;
    use crate::generators::GeneratorRegistry;
    use crate::rng::RandomSource;

    fn table(name: &str, primary_key: &[&str], references: Option<ForeignKeyTarget>) -> Table {
        let registry = GeneratorRegistry::new(RandomSource::seeded(0));
        let schema = TableSchema {
            name: name.to_string(),
            columns: vec![ColumnSchema {
                name: "ref_id".to_string(),
                raw_type: "integer".to_string(),
                semantic_type: SemanticType::Integer,
                is_foreign_key: true,
                references,
                auto_generated: false,
            }],
            primary_key: primary_key.iter().map(|key| key.to_string()).collect(),
            depends_on: Vec::new(),
        };
        Table::from_schema(&schema, &registry)
    }

    fn target(table: &str, column: Option<&str>) -> Option<ForeignKeyTarget> {
        Some(ForeignKeyTarget {
            table: table.to_string(),
            column: column.map(str::to_string),
        })
    }

    #[test]
    fn prefers_recorded_column() {
        let orders = table("orders", &[], target("users", Some("email")));
        let users = table("users", &["id"], None);
        let key = resolve_reference(&orders, &orders.columns[0], &[users]).unwrap();
        assert_eq!(key.table, "users");
        assert_eq!(key.column, "email");
    }

    #[test]
    fn falls_back_to_first_primary_key_column() {
        let orders = table("orders", &[], target("users", None));
        let users = table("users", &["ref_id"], None);
        let key = resolve_reference(&orders, &orders.columns[0], &[users]).unwrap();
        assert_eq!(key.column, "ref_id");
    }

    #[test]
    fn reports_missing_reference_and_key() {
        let orphan = table("orders", &[], None);
        let err = resolve_reference(&orphan, &orphan.columns[0], &[]).unwrap_err();
        assert!(matches!(err, GenerationError::MissingReferenceTable { .. }));

        let keyless = table("orders", &[], target("audit", None));
        let audit = table("audit", &[], None);
        let err = resolve_reference(&keyless, &keyless.columns[0], &[audit]).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::MissingReferenceKey { ref referenced, .. } if referenced == "audit"
        ));
    }
}
