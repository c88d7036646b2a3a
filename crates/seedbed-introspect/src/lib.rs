//! Database schema discovery adapters.

pub mod adapter;
pub mod options;
pub mod postgres;

pub use adapter::Adapter;
pub use options::IntrospectOptions;
pub use postgres::{PostgresAdapter, introspect_postgres};

pub use seedbed_core::DatabaseSchema;
