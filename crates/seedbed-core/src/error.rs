use thiserror::Error;

/// Core error type shared across seedbed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The raw column type does not follow the `name[(n[,m])] [qualifier]` grammar,
    /// or carries parameters/qualifiers its type does not accept.
    #[error("malformed column type '{raw}': {reason}")]
    MalformedType { raw: String, reason: String },
    /// The type name matched no entry of the catalog.
    #[error("unknown column type '{name}' (from '{raw}')")]
    UnknownType { raw: String, name: String },
    /// Two or more distinct tables depend on each other.
    #[error("cyclic table dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
    /// A dependency names a table that was not discovered.
    #[error("table '{table}' depends on unknown table '{dependency}'")]
    MissingDependency { table: String, dependency: String },
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by seedbed crates.
pub type Result<T> = std::result::Result<T, Error>;
