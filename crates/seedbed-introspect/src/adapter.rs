use async_trait::async_trait;

use seedbed_core::{DatabaseSchema, Result};

use crate::options::IntrospectOptions;

/// Trait implemented by database adapters that can discover schemas.
#[async_trait]
pub trait Adapter {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Discover the tables of one namespace.
    async fn introspect(&self, opts: &IntrospectOptions) -> Result<DatabaseSchema>;
}
