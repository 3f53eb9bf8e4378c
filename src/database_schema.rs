use crate::error::{introspection_error, Result};
use crate::types::{ColumnMeta, ForeignKeyMeta, PrimaryKeyMeta, TableMeta};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info, instrument};

const TABLES_SQL: &str = "
select
    schemaname::text,
    tablename::text,
    quote_ident(schemaname) || '.' || quote_ident(tablename) as qualified_name
from
    pg_catalog.pg_tables
where
    schemaname = $1
order by
    tablename";

const COLUMNS_SQL: &str = "
select
    attname::text,
    atttypid::regtype::text as atttype,
    attnum::int4,
    attnotnull
from
    pg_catalog.pg_attribute
where
    attrelid = $1::regclass
    and attnum > 0
    and not attisdropped
order by
    attnum";

// Foreign tables outside the scanned schema come back schema-qualified and
// stay unresolved when the reference index is built.
const FOREIGN_KEYS_SQL: &str = "
select
    c.conname::text,
    case
        when n.nspname = $2 then f.relname::text
        else quote_ident(n.nspname) || '.' || quote_ident(f.relname)
    end as foreign_table,
    c.conkey::int4[],
    c.confkey::int4[]
from
    pg_catalog.pg_constraint c
    join pg_catalog.pg_class f on f.oid = c.confrelid
    join pg_catalog.pg_namespace n on n.oid = f.relnamespace
where
    c.conrelid = $1::regclass
    and c.contype = 'f'
order by
    c.conname";

const PRIMARY_KEYS_SQL: &str = "
select
    conname::text,
    conkey::int4[]
from
    pg_catalog.pg_constraint
where
    conrelid = $1::regclass
    and contype = 'p'";

fn table_row(row: &PgRow) -> sqlx::Result<(TableMeta, String)> {
    let table = TableMeta::new(row.try_get::<String, _>(0)?, row.try_get::<String, _>(1)?);
    Ok((table, row.try_get(2)?))
}

fn column_row(row: &PgRow) -> sqlx::Result<ColumnMeta> {
    Ok(ColumnMeta {
        column_name: row.try_get(0)?,
        column_type: row.try_get(1)?,
        ordinal_position: row.try_get(2)?,
        not_null: row.try_get(3)?,
        is_primary_key: false,
    })
}

fn foreign_key_row(row: &PgRow) -> sqlx::Result<ForeignKeyMeta> {
    Ok(ForeignKeyMeta {
        constraint_name: row.try_get(0)?,
        foreign_table_name: row.try_get(1)?,
        local_column_positions: row.try_get(2)?,
        foreign_column_positions: row.try_get(3)?,
    })
}

fn primary_key_row(row: &PgRow) -> sqlx::Result<PrimaryKeyMeta> {
    Ok(PrimaryKeyMeta {
        constraint_name: row.try_get(0)?,
        column_positions: row.try_get(1)?,
    })
}

/// Decodes every row, stopping at the first column that fails to decode.
fn decode_all<R, T>(rows: Vec<R>, decode: fn(&R) -> sqlx::Result<T>) -> sqlx::Result<Vec<T>> {
    rows.iter().map(decode).collect()
}

/// Reads every table of `schema` with its columns and key constraints.
#[instrument(skip(pool))]
pub async fn scan_database_schema(pool: &PgPool, schema: &str) -> Result<Vec<TableMeta>> {
    let tables: Vec<(TableMeta, String)> = sqlx::query(TABLES_SQL)
        .bind(schema)
        .fetch_all(pool)
        .await
        .and_then(|rows| decode_all(rows, table_row))
        .map_err(introspection_error("tables", schema))?;

    let mut tables_meta = Vec::with_capacity(tables.len());

    for (mut table, qualified_name) in tables {
        table.columns = sqlx::query(COLUMNS_SQL)
            .bind(&qualified_name)
            .fetch_all(pool)
            .await
            .and_then(|rows| decode_all(rows, column_row))
            .map_err(introspection_error("columns", &table.name))?;

        table.foreign_keys = sqlx::query(FOREIGN_KEYS_SQL)
            .bind(&qualified_name)
            .bind(schema)
            .fetch_all(pool)
            .await
            .and_then(|rows| decode_all(rows, foreign_key_row))
            .map_err(introspection_error("foreign keys", &table.name))?;

        table.primary_keys = sqlx::query(PRIMARY_KEYS_SQL)
            .bind(&qualified_name)
            .fetch_all(pool)
            .await
            .and_then(|rows| decode_all(rows, primary_key_row))
            .map_err(introspection_error("primary keys", &table.name))?;

        table.mark_primary_keys();

        debug!(
            table = %table.name,
            columns = table.columns.len(),
            foreign_keys = table.foreign_keys.len(),
            "scanned table"
        );

        tables_meta.push(table);
    }

    info!(schema, tables = tables_meta.len(), "scanned schema");

    Ok(tables_meta)
}
