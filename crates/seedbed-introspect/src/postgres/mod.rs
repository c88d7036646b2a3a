use sqlx::PgPool;
use tracing::{debug, info};

use seedbed_core::{DatabaseSchema, Result};

use crate::adapter::Adapter;
use crate::options::IntrospectOptions;

mod mapper;
mod queries;

/// Adapter for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Adapter for PostgresAdapter {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn introspect(&self, opts: &IntrospectOptions) -> Result<DatabaseSchema> {
        introspect_postgres(&self.pool, opts).await
    }
}

/// Discover the tables, columns and keys of one namespace.
///
/// Tables are returned sorted by name with columns in declaration order.
pub async fn introspect_postgres(
    pool: &PgPool,
    opts: &IntrospectOptions,
) -> Result<DatabaseSchema> {
    let database = queries::fetch_database_name(pool).await?;
    let names = queries::list_tables(pool, &opts.namespace, opts.include_partitioned).await?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let columns = queries::list_columns(pool, &opts.namespace, &name).await?;
        let primary_key = queries::get_primary_key(pool, &opts.namespace, &name).await?;
        let foreign_keys = queries::list_foreign_key_columns(pool, &opts.namespace, &name).await?;
        debug!(
            table = %name,
            columns = columns.len(),
            foreign_keys = foreign_keys.len(),
            "table discovered"
        );
        tables.push(mapper::map_table(
            &opts.namespace,
            name,
            columns,
            primary_key,
            &foreign_keys,
        )?);
    }

    info!(
        database = %database,
        namespace = %opts.namespace,
        tables = tables.len(),
        "schema discovered"
    );

    Ok(DatabaseSchema {
        engine: "postgres".to_string(),
        database: Some(database),
        namespace: opts.namespace.clone(),
        tables,
    })
}
