use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use seedbed_generate::{ColumnBinding, RowStore, StoreError};

/// Row store writing into a PostgreSQL namespace.
///
/// Values arrive as text and are cast to each column's declared type in
/// the statement, so the server does the parsing.
#[derive(Debug, Clone)]
pub struct PgRowStore {
    pool: PgPool,
    namespace: String,
}

impl PgRowStore {
    pub fn new(pool: PgPool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    /// Tables named `schema.table` live outside the configured namespace.
    fn qualified(&self, table: &str) -> String {
        match table.split_once('.') {
            Some((namespace, name)) => format!("{}.{}", quote_ident(namespace), quote_ident(name)),
            None => format!("{}.{}", quote_ident(&self.namespace), quote_ident(table)),
        }
    }
}

#[async_trait(?Send)]
impl RowStore for PgRowStore {
    async fn insert_row(
        &mut self,
        table: &str,
        columns: &[ColumnBinding],
        values: &[String],
    ) -> Result<(), StoreError> {
        if columns.len() != values.len() {
            return Err(StoreError::Rejected(format!(
                "{} values for {} columns",
                values.len(),
                columns.len()
            )));
        }

        let sql = insert_statement(&self.qualified(table), columns);
        let mut query = sqlx::query(&sql);
        for value in values {
            query = query.bind(value);
        }
        query.execute(&self.pool).await.map_err(store_error)?;
        Ok(())
    }

    async fn sample_key(
        &mut self,
        table: &str,
        column: &str,
    ) -> Result<Option<String>, StoreError> {
        let sql = sample_statement(&self.qualified(table), column);
        debug!(table = %table, column = %column, "sampling referenced key");
        sqlx::query_scalar::<_, String>(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)
    }
}

fn insert_statement(target: &str, columns: &[ColumnBinding]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {target} DEFAULT VALUES");
    }

    let names = columns
        .iter()
        .map(|column| quote_ident(&column.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| format!("${}::{}", idx + 1, column.sql_type))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {target} ({names}) VALUES ({placeholders})")
}

fn sample_statement(target: &str, column: &str) -> String {
    let column = quote_ident(column);
    format!(
        "SELECT {column}::text FROM {target} WHERE {column} IS NOT NULL ORDER BY random() LIMIT 1"
    )
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) => StoreError::Rejected(db.message().to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str, sql_type: &str) -> ColumnBinding {
        ColumnBinding {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
        }
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn builds_insert_with_casts() {
        let sql = insert_statement(
            "\"public\".\"orders\"",
            &[
                binding("user_id", "integer"),
                binding("placed_at", "timestamp with time zone"),
            ],
        );
        assert_eq!(
            sql,
            "INSERT INTO \"public\".\"orders\" (\"user_id\", \"placed_at\") \
             VALUES ($1::integer, $2::timestamp with time zone)"
        );
    }

    #[test]
    fn falls_back_to_default_values() {
        assert_eq!(
            insert_statement("\"public\".\"tokens\"", &[]),
            "INSERT INTO \"public\".\"tokens\" DEFAULT VALUES"
        );
    }

    #[test]
    fn samples_non_null_keys_as_text() {
        assert_eq!(
            sample_statement("\"public\".\"users\"", "id"),
            "SELECT \"id\"::text FROM \"public\".\"users\" WHERE \"id\" IS NOT NULL \
             ORDER BY random() LIMIT 1"
        );
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a PostgreSQL instance"]
    async fn inserts_and_samples_against_postgres() {
        let Ok(url) =
            std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
        else {
            return;
        };
        let pool = PgPool::connect(&url).await.unwrap();
        sqlx::query("CREATE SCHEMA IF NOT EXISTS seedbed_store_it")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS seedbed_store_it.people \
             (id serial PRIMARY KEY, name varchar(40) NOT NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let mut store = PgRowStore::new(pool.clone(), "seedbed_store_it");
        store
            .insert_row(
                "people",
                &[binding("name", "character varying(40)")],
                &["Ada".to_string()],
            )
            .await
            .unwrap();
        let key = store.sample_key("people", "id").await.unwrap();
        assert!(key.is_some());

        let err = store
            .insert_row("people", &[binding("id", "integer")], &["nope".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));

        sqlx::query("DROP SCHEMA seedbed_store_it CASCADE")
            .execute(&pool)
            .await
            .unwrap();
    }
}
