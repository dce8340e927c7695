use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{PgConnection, Row};
use std::collections::HashMap;
use std::time::Duration;

use crate::core::error::{ConfigError, Error};
use crate::store::HashStore;

const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Records in two tables: `records` holds the key and its deadline,
/// `record_fields` the hash fields. Every call borrows a pooled connection
/// for its own duration only.
#[derive(Clone, Debug)]
pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub(crate) async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub(crate) async fn migrate(&self) -> Result<(), ConfigError> {
        sqlx::migrate!().run(&self.pool).await?;

        Ok(())
    }
}

/// Drops an expired record so a write starts from an empty hash, then makes
/// sure the record row exists.
async fn ensure_record(conn: &mut PgConnection, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM records WHERE key = $1 AND expires_at <= now();")
        .bind(key)
        .execute(&mut *conn)
        .await?;

    sqlx::query("INSERT INTO records (key) VALUES ($1) ON CONFLICT (key) DO NOTHING;")
        .bind(key)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

fn map_counter_error(key: &str, e: sqlx::Error) -> Error {
    let code = match &e {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    };

    match code.as_deref() {
        Some(NUMERIC_VALUE_OUT_OF_RANGE) => Error::Overflow,
        Some(INVALID_TEXT_REPRESENTATION) => Error::CorruptRecord(key.to_owned()),
        _ => Error::Sql(e),
    }
}

impl HashStore for PgStore {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, Error> {
        let mut conn = self.pool.acquire().await?;

        let value = sqlx::query(
            "SELECT f.value
            FROM record_fields f
            JOIN records r ON r.key = f.key
            WHERE f.key = $1
                AND f.field = $2
                AND (r.expires_at IS NULL OR r.expires_at > now());",
        )
        .bind(key)
        .bind(field)
        .map(|row: PgRow| row.get("value"))
        .fetch_optional(&mut *conn)
        .await?;

        Ok(value)
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, Error> {
        let mut conn = self.pool.acquire().await?;

        let fields: Vec<(String, String)> = sqlx::query(
            "SELECT f.field, f.value
            FROM record_fields f
            JOIN records r ON r.key = f.key
            WHERE f.key = $1
                AND (r.expires_at IS NULL OR r.expires_at > now());",
        )
        .bind(key)
        .map(|row: PgRow| (row.get("field"), row.get("value")))
        .fetch_all(&mut *conn)
        .await?;

        Ok(fields.into_iter().collect())
    }

    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        ensure_record(&mut tx, key).await?;

        for (field, value) in fields {
            sqlx::query(
                "INSERT INTO record_fields (key, field, value) VALUES ($1, $2, $3)
                ON CONFLICT (key, field) DO UPDATE SET value = EXCLUDED.value;",
            )
            .bind(key)
            .bind(*field)
            .bind(*value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, Error> {
        let mut tx = self.pool.begin().await?;

        ensure_record(&mut tx, key).await?;

        let value: String = sqlx::query(
            "INSERT INTO record_fields (key, field, value)
            VALUES ($1, $2, CAST(CAST($3 AS BIGINT) AS TEXT))
            ON CONFLICT (key, field) DO UPDATE
                SET value = CAST(CAST(record_fields.value AS BIGINT) + CAST($3 AS BIGINT) AS TEXT)
            RETURNING value;",
        )
        .bind(key)
        .bind(field)
        .bind(delta)
        .map(|row: PgRow| row.get("value"))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_counter_error(key, e))?;

        tx.commit().await?;

        value
            .parse()
            .map_err(|_| Error::CorruptRecord(key.to_owned()))
    }

    async fn hdel(&self, key: &str, fields: &[&str]) -> Result<u64, Error> {
        let mut tx = self.pool.begin().await?;

        let fields: Vec<String> = fields.iter().map(|field| (*field).to_owned()).collect();

        let removed = sqlx::query(
            "DELETE FROM record_fields f
            USING records r
            WHERE r.key = f.key
                AND f.key = $1
                AND f.field = ANY($2)
                AND (r.expires_at IS NULL OR r.expires_at > now());",
        )
        .bind(key)
        .bind(fields)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            "DELETE FROM records r
            WHERE r.key = $1
                AND NOT EXISTS (SELECT 1 FROM record_fields f WHERE f.key = r.key);",
        )
        .bind(key)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(removed)
    }

    async fn del(&self, key: &str) -> Result<bool, Error> {
        let mut conn = self.pool.acquire().await?;

        let removed = sqlx::query(
            "DELETE FROM records
            WHERE key = $1
                AND (expires_at IS NULL OR expires_at > now());",
        )
        .bind(key)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        Ok(removed > 0)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, Error> {
        let mut conn = self.pool.acquire().await?;

        let updated = sqlx::query(
            "UPDATE records
            SET expires_at = now() + make_interval(secs => $2)
            WHERE key = $1
                AND (expires_at IS NULL OR expires_at > now());",
        )
        .bind(key)
        .bind(ttl.as_secs_f64())
        .execute(&mut *conn)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn key_count(&self) -> Result<u64, Error> {
        let mut conn = self.pool.acquire().await?;

        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count
            FROM records
            WHERE expires_at IS NULL OR expires_at > now();",
        )
        .map(|row: PgRow| row.get("count"))
        .fetch_one(&mut *conn)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        let mut conn = self.pool.acquire().await?;

        let purged = sqlx::query("DELETE FROM records WHERE expires_at <= now();")
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(purged)
    }
}
