//! Core contracts and helpers for seedbed.
//!
//! This crate defines the discovered schema model, the semantic type catalog,
//! the rule configuration model and the table dependency ordering shared by
//! the adapters, the generation engine and the CLI.

pub mod error;
pub mod graph;
pub mod redaction;
pub mod rules;
pub mod schema;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use graph::{
    DependencyNode, DependencyOrder, DependencyReport, DependencySummary, MissingDependency,
    MissingDependencyPolicy, dependency_report, topological_order,
};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use rules::{RulesConfig, TableRule};
pub use schema::{ColumnSchema, DatabaseSchema, ForeignKeyTarget, TableSchema};
pub use types::SemanticType;
pub use validation::validate_schema;
