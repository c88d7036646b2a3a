use sqlx::{FromRow, PgPool};

use seedbed_core::{Error, Result};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub async fn fetch_database_name(pool: &PgPool) -> Result<String> {
    sqlx::query_scalar::<_, String>("select current_database()")
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

pub async fn list_tables(
    pool: &PgPool,
    namespace: &str,
    include_partitioned: bool,
) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select c.relname::text
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and (c.relkind = 'r' or ($2 and c.relkind = 'p'))
          and not c.relispartition
        order by c.relname
        "#,
    )
    .bind(namespace)
    .bind(include_partitioned)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, Clone, FromRow)]
pub struct RawColumn {
    pub name: String,
    /// `format_type` rendering, e.g. `character varying(50)`.
    pub data_type: String,
    pub default: Option<String>,
    pub is_identity: bool,
    pub is_generated: bool,
}

pub async fn list_columns(pool: &PgPool, namespace: &str, table: &str) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          a.attname::text as name,
          pg_catalog.format_type(a.atttypid, a.atttypmod) as data_type,
          pg_get_expr(ad.adbin, ad.adrelid) as "default",
          (a.attidentity <> '') as is_identity,
          (a.attgenerated <> '') as is_generated
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        left join pg_attrdef ad on ad.adrelid = a.attrelid and ad.adnum = a.attnum
        where n.nspname = $1
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        order by a.attnum
        "#,
    )
    .bind(namespace)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

/// Primary-key column names in key order.
pub async fn get_primary_key(pool: &PgPool, namespace: &str, table: &str) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select a.attname::text
        from pg_constraint con
        join pg_class c on c.oid = con.conrelid
        join pg_namespace n on n.oid = c.relnamespace
        join unnest(con.conkey) with ordinality as k(attnum, ord) on true
        join pg_attribute a on a.attrelid = c.oid and a.attnum = k.attnum
        where n.nspname = $1
          and c.relname = $2
          and con.contype = 'p'
        order by k.ord
        "#,
    )
    .bind(namespace)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

/// One column pair of a foreign-key constraint.
#[derive(Debug, Clone, FromRow)]
pub struct RawForeignKeyColumn {
    pub constraint_name: String,
    pub column_name: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

pub async fn list_foreign_key_columns(
    pool: &PgPool,
    namespace: &str,
    table: &str,
) -> Result<Vec<RawForeignKeyColumn>> {
    sqlx::query_as::<_, RawForeignKeyColumn>(
        r#"
        select
          con.conname::text as constraint_name,
          src_att.attname::text as column_name,
          ref_nsp.nspname::text as referenced_schema,
          ref_rel.relname::text as referenced_table,
          ref_att.attname::text as referenced_column
        from pg_constraint con
        join pg_class src_rel on src_rel.oid = con.conrelid
        join pg_namespace src_nsp on src_nsp.oid = src_rel.relnamespace
        join pg_class ref_rel on ref_rel.oid = con.confrelid
        join pg_namespace ref_nsp on ref_nsp.oid = ref_rel.relnamespace
        join unnest(con.conkey, con.confkey) with ordinality
          as k(src_attnum, ref_attnum, ord) on true
        join pg_attribute src_att
          on src_att.attrelid = src_rel.oid and src_att.attnum = k.src_attnum
        join pg_attribute ref_att
          on ref_att.attrelid = ref_rel.oid and ref_att.attnum = k.ref_attnum
        where src_nsp.nspname = $1
          and src_rel.relname = $2
          and con.contype = 'f'
        order by con.conname, k.ord
        "#,
    )
    .bind(namespace)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}
