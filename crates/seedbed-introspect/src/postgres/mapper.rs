use seedbed_core::{ColumnSchema, ForeignKeyTarget, Result, SemanticType, TableSchema};

use super::queries::{RawColumn, RawForeignKeyColumn};

/// Assemble one table from its raw catalog rows.
///
/// Fails when a column type cannot be parsed; such a table cannot be
/// generated safely.
pub fn map_table(
    namespace: &str,
    name: String,
    columns: Vec<RawColumn>,
    primary_key: Vec<String>,
    foreign_keys: &[RawForeignKeyColumn],
) -> Result<TableSchema> {
    let columns = columns
        .into_iter()
        .map(|column| map_column(namespace, column, foreign_keys))
        .collect::<Result<Vec<_>>>()?;

    let mut depends_on: Vec<String> = Vec::new();
    for fk in foreign_keys {
        let referenced = referenced_name(namespace, fk);
        if !depends_on.contains(&referenced) {
            depends_on.push(referenced);
        }
    }

    Ok(TableSchema {
        name,
        columns,
        primary_key,
        depends_on,
    })
}

fn map_column(
    namespace: &str,
    raw: RawColumn,
    foreign_keys: &[RawForeignKeyColumn],
) -> Result<ColumnSchema> {
    let mut semantic_type = SemanticType::parse(&raw.data_type)?;
    let uses_sequence = raw
        .default
        .as_deref()
        .is_some_and(|default| default.trim_start().starts_with("nextval("));
    if uses_sequence {
        semantic_type = semantic_type.as_serial();
    }

    let references = foreign_keys
        .iter()
        .find(|fk| fk.column_name == raw.name)
        .map(|fk| ForeignKeyTarget {
            table: referenced_name(namespace, fk),
            column: Some(fk.referenced_column.clone()),
        });

    Ok(ColumnSchema {
        name: raw.name,
        raw_type: raw.data_type,
        semantic_type,
        is_foreign_key: references.is_some(),
        references,
        auto_generated: uses_sequence || raw.is_identity || raw.is_generated,
    })
}

/// Referenced tables outside the namespace keep their schema prefix.
fn referenced_name(namespace: &str, fk: &RawForeignKeyColumn) -> String {
    if fk.referenced_schema == namespace {
        fk.referenced_table.clone()
    } else {
        format!("{}.{}", fk.referenced_schema, fk.referenced_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, data_type: &str, default: Option<&str>) -> RawColumn {
        RawColumn {
            name: name.to_string(),
            data_type: data_type.to_string(),
            default: default.map(str::to_string),
            is_identity: false,
            is_generated: false,
        }
    }

    fn fk(column: &str, schema: &str, table: &str) -> RawForeignKeyColumn {
        RawForeignKeyColumn {
            constraint_name: format!("{column}_fkey"),
            column_name: column.to_string(),
            referenced_schema: schema.to_string(),
            referenced_table: table.to_string(),
            referenced_column: "id".to_string(),
        }
    }

    #[test]
    fn maps_sequences_identities_and_references() {
        let mut slug = raw("slug", "text", None);
        slug.is_generated = true;
        let mut code = raw("code", "bigint", None);
        code.is_identity = true;

        let table = map_table(
            "public",
            "orders".to_string(),
            vec![
                raw("id", "integer", Some("nextval('orders_id_seq'::regclass)")),
                raw("user_id", "integer", None),
                raw("reviewer_id", "integer", None),
                raw("total", "numeric(10,2)", None),
                slug,
                code,
                raw("created_by", "integer", None),
            ],
            vec!["id".to_string()],
            &[
                fk("user_id", "public", "users"),
                fk("reviewer_id", "public", "users"),
                fk("created_by", "audit", "accounts"),
            ],
        )
        .unwrap();

        let id = &table.columns[0];
        assert_eq!(id.semantic_type, SemanticType::Serial);
        assert!(id.auto_generated);

        let user_id = &table.columns[1];
        assert!(user_id.is_foreign_key);
        assert_eq!(
            user_id.references,
            Some(ForeignKeyTarget {
                table: "users".to_string(),
                column: Some("id".to_string()),
            })
        );

        assert_eq!(
            table.columns[3].semantic_type,
            SemanticType::Numeric {
                precision: Some(10),
                scale: Some(2),
            }
        );
        assert!(table.columns[4].auto_generated);
        assert!(table.columns[5].auto_generated);
        assert_eq!(table.columns[5].semantic_type, SemanticType::BigInt);
        assert_eq!(
            table.columns[6].references.as_ref().map(|target| target.table.as_str()),
            Some("audit.accounts")
        );
        assert_eq!(table.depends_on, ["users", "audit.accounts"]);
    }

    #[test]
    fn unparseable_type_fails_the_table() {
        let err = map_table(
            "public",
            "events".to_string(),
            vec![raw("tags", "text[]", None)],
            Vec::new(),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, seedbed_core::Error::MalformedType { .. }));
    }
}
