use thiserror::Error;

/// Failures reported by a [`RowStore`](crate::store::RowStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(String),
    #[error("unknown table: {0}")]
    UnknownTable(String),
    /// The row was refused (constraint violation, type mismatch).
    #[error("row rejected: {0}")]
    Rejected(String),
}

/// Errors emitted by rule compilation and population.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("malformed rule '{rule}': {reason}")]
    MalformedRule { rule: String, reason: String },
    #[error("unknown rule '{name}' (from '{rule}')")]
    UnknownRule { rule: String, name: String },
    #[error("rule '{rule}' for {table}.{column} failed: {source}")]
    RuleApplication {
        table: String,
        column: String,
        rule: String,
        #[source]
        source: Box<GenerationError>,
    },
    #[error("foreign key {table}.{column} has no referenced table")]
    MissingReferenceTable { table: String, column: String },
    #[error("foreign key {table}.{column} references {referenced}, which has no key column")]
    MissingReferenceKey {
        table: String,
        column: String,
        referenced: String,
    },
    #[error("foreign key {table}.{column}: no rows available in {referenced}")]
    NoReferenceRowsAvailable {
        table: String,
        column: String,
        referenced: String,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Core(#[from] seedbed_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl GenerationError {
    pub(crate) fn malformed(rule: &str, reason: impl Into<String>) -> Self {
        GenerationError::MalformedRule {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }
}
