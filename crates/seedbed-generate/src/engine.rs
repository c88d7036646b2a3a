use std::time::Instant;

use seedbed_core::{DependencyOrder, topological_order};
use tracing::{debug, info, warn};

use crate::errors::GenerationError;
use crate::foreign::{ReferenceKey, resolve_reference};
use crate::generators::GeneratorFn;
use crate::model::{Column, PopulateOptions, PopulationReport, Table, TableReport, TableStatus};
use crate::store::{ColumnBinding, RowStore};

/// Walks tables in dependency order and fills them through a [`RowStore`].
#[derive(Debug, Clone, Default)]
pub struct PopulationEngine {
    options: PopulateOptions,
}

enum ValueSource<'a> {
    Generator(&'a GeneratorFn),
    Reference(ReferenceKey),
}

impl PopulationEngine {
    pub fn new(options: PopulateOptions) -> Self {
        Self { options }
    }

    /// Populate every table, dependencies first.
    ///
    /// Fails only when the tables cannot be ordered. Per-table failures are
    /// recorded in the report and population moves on to the next table.
    pub async fn run<S: RowStore + ?Sized>(
        &self,
        store: &mut S,
        tables: Vec<Table>,
    ) -> Result<PopulationReport, GenerationError> {
        let started = Instant::now();
        let DependencyOrder { tables, missing } =
            topological_order(tables, self.options.missing_dependencies)?;

        for skipped in &missing {
            warn!(
                table = %skipped.table,
                dependency = %skipped.dependency,
                "dependency is not a discovered table; treating it as satisfied"
            );
        }

        let order: Vec<String> = tables.iter().map(|table| table.name.clone()).collect();
        info!(
            event = "population_start",
            tables = tables.len(),
            order = ?order,
            "populating tables"
        );

        let mut reports = Vec::with_capacity(tables.len());
        for table in &tables {
            reports.push(self.populate_table(store, table, &tables).await);
        }

        let report = PopulationReport {
            order,
            missing_dependencies: missing,
            tables: reports,
        };
        info!(
            event = "population_finished",
            rows_inserted = report.rows_inserted(),
            rows_failed = report.rows_failed(),
            tables_aborted = report.aborted_tables().count(),
            duration_ms = started.elapsed().as_millis() as u64,
            "population finished"
        );
        Ok(report)
    }

    /// Insert `table.rows` rows into one table.
    ///
    /// `tables` supplies primary keys for foreign-key columns without a
    /// recorded referenced column. Failed inserts are counted and skipped; a
    /// foreign key that cannot be resolved aborts the table.
    pub async fn populate_table<S: RowStore + ?Sized>(
        &self,
        store: &mut S,
        table: &Table,
        tables: &[Table],
    ) -> TableReport {
        let mut report = TableReport::new(&table.name, table.rows);
        if table.rows == 0 {
            debug!(table = %table.name, "no rows requested; skipping");
            report.status = TableStatus::Skipped;
            return report;
        }

        info!(table = %table.name, rows = table.rows, "populating table");
        if let Err(err) = insert_rows(store, table, tables, &mut report).await {
            warn!(
                table = %table.name,
                rows_inserted = report.rows_inserted,
                error = %err,
                "table population aborted"
            );
            report.status = TableStatus::Aborted {
                reason: err.to_string(),
            };
            return report;
        }

        info!(
            table = %table.name,
            rows_requested = report.rows_requested,
            rows_inserted = report.rows_inserted,
            rows_failed = report.rows_failed,
            "table populated"
        );
        report
    }
}

async fn insert_rows<S: RowStore + ?Sized>(
    store: &mut S,
    table: &Table,
    tables: &[Table],
    report: &mut TableReport,
) -> Result<(), GenerationError> {
    let columns: Vec<&Column> = table.insert_columns().collect();
    let bindings: Vec<ColumnBinding> = columns.iter().map(|column| (*column).into()).collect();
    let sources = columns
        .iter()
        .copied()
        .map(|column| {
            if column.is_foreign_key {
                resolve_reference(table, column, tables).map(ValueSource::Reference)
            } else {
                Ok(ValueSource::Generator(&column.generator))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    for row in 0..table.rows {
        let mut values = Vec::with_capacity(sources.len());
        for (column, source) in columns.iter().zip(&sources) {
            let value = match source {
                ValueSource::Generator(generator) => generator.generate(),
                ValueSource::Reference(key) => store
                    .sample_key(&key.table, &key.column)
                    .await?
                    .ok_or_else(|| GenerationError::NoReferenceRowsAvailable {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        referenced: key.table.clone(),
                    })?,
            };
            values.push(value);
        }

        match store.insert_row(&table.name, &bindings, &values).await {
            Ok(()) => report.rows_inserted += 1,
            Err(err) => {
                report.rows_failed += 1;
                warn!(table = %table.name, row, error = %err, "row insert failed");
            }
        }
    }

    Ok(())
}
