use seedbed_core::{DatabaseSchema, RulesConfig};
use tracing::{debug, warn};

use crate::errors::GenerationError;
use crate::generators::{GeneratorFn, GeneratorRegistry};
use crate::model::Table;

/// Build generation tables from a discovered schema with default generators.
pub fn plan_tables(schema: &DatabaseSchema, registry: &GeneratorRegistry) -> Vec<Table> {
    schema
        .tables
        .iter()
        .map(|table| Table::from_schema(table, registry))
        .collect()
}

/// Apply configured row counts and column rules to the tables.
///
/// Every rule of a table is compiled before any of them is attached, so a
/// failing rule leaves that table untouched; tables handled earlier keep
/// their rules. Rules for unknown tables or columns are skipped with a
/// warning.
pub fn apply_rules(
    tables: &mut [Table],
    rules: &RulesConfig,
    registry: &GeneratorRegistry,
) -> Result<(), GenerationError> {
    for (table_name, rule) in &rules.rules {
        let Some(table) = tables.iter_mut().find(|table| &table.name == table_name) else {
            warn!(table = %table_name, "rules reference unknown table; skipping");
            continue;
        };

        let mut compiled: Vec<(String, GeneratorFn)> = Vec::with_capacity(rule.columns.len());
        for (column_name, rule_text) in &rule.columns {
            let Some(column) = table.column(column_name) else {
                warn!(
                    table = %table_name,
                    column = %column_name,
                    "rule references unknown column; skipping"
                );
                continue;
            };

            if column.is_foreign_key {
                warn!(
                    table = %table_name,
                    column = %column_name,
                    "foreign key values are sampled from the referenced table; rule ignored"
                );
            } else if !column.is_insertable() || table.is_primary_key(column_name) {
                debug!(
                    table = %table_name,
                    column = %column_name,
                    "column is not inserted; rule has no effect"
                );
            }

            let generator = registry.compile(rule_text).map_err(|source| {
                GenerationError::RuleApplication {
                    table: table_name.clone(),
                    column: column_name.clone(),
                    rule: rule_text.clone(),
                    source: Box::new(source),
                }
            })?;
            compiled.push((column_name.clone(), generator));
        }

        table.rows = rule.num;
        for (column_name, generator) in compiled {
            if let Some(column) = table.column_mut(&column_name) {
                column.generator = generator;
            }
        }
        debug!(table = %table_name, rows = rule.num, "rules applied");
    }

    Ok(())
}
