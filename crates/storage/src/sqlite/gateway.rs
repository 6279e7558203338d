//! The three statement primitives every repository is built on: execute a
//! statement, fetch the first row, fetch all rows.
//!
//! Each primitive has a pool-level method on [`SqliteRepository`] and an
//! executor-generic twin used inside transactions.

use sqlx::Executor;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};

use super::SqliteRepository;
use crate::repository::StorageError;

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    Bool(bool),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executed {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_params<'q>(mut query: SqliteQuery<'q>, params: &[SqlParam]) -> SqliteQuery<'q> {
    for param in params {
        query = match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.clone()),
            SqlParam::Bool(v) => query.bind(*v),
        };
    }
    query
}

/// Maps driver errors onto `StorageError`.
///
/// Unique and foreign-key violations become `Conflict`; everything else is a
/// backend failure.
pub(crate) fn db_error(err: sqlx::Error) -> StorageError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            StorageError::Conflict
        }
        _ => StorageError::Connection(err.to_string()),
    }
}

pub(crate) async fn execute_on<'e, E>(
    executor: E,
    sql: &str,
    params: &[SqlParam],
) -> Result<Executed, StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    tracing::debug!(sql, params = params.len(), "execute");
    let res = bind_params(sqlx::query(sql), params)
        .execute(executor)
        .await
        .map_err(db_error)?;
    Ok(Executed {
        rows_affected: res.rows_affected(),
        last_insert_id: res.last_insert_rowid(),
    })
}

pub(crate) async fn fetch_first_on<'e, E>(
    executor: E,
    sql: &str,
    params: &[SqlParam],
) -> Result<Option<SqliteRow>, StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    tracing::debug!(sql, params = params.len(), "fetch_first");
    bind_params(sqlx::query(sql), params)
        .fetch_optional(executor)
        .await
        .map_err(db_error)
}

pub(crate) async fn fetch_all_on<'e, E>(
    executor: E,
    sql: &str,
    params: &[SqlParam],
) -> Result<Vec<SqliteRow>, StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    tracing::debug!(sql, params = params.len(), "fetch_all");
    bind_params(sqlx::query(sql), params)
        .fetch_all(executor)
        .await
        .map_err(db_error)
}

impl SqliteRepository {
    /// Run a parameterized DDL/DML statement.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` for constraint violations and
    /// `StorageError::Connection` for any other failure.
    pub async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<Executed, StorageError> {
        execute_on(&self.pool, sql, params).await
    }

    /// Run a query and return its first row, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    pub async fn fetch_first(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Option<SqliteRow>, StorageError> {
        fetch_first_on(&self.pool, sql, params).await
    }

    /// Run a query and return every row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    pub async fn fetch_all(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<SqliteRow>, StorageError> {
        fetch_all_on(&self.pool, sql, params).await
    }
}
