// src/db/mod.rs

pub mod migrations;

use std::{str::FromStr, time::Duration};

use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

/// Opens the process-wide pool.
///
/// Foreign keys are enabled on every connection so that `ON DELETE CASCADE` applies.
/// SQLite serializes writers itself; the busy timeout makes concurrent requests wait
/// for the lock instead of failing.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

/// Opens the pool and brings the schema up to date.
pub async fn init(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = connect(database_url).await?;
    migrations::run(&pool).await?;
    Ok(pool)
}

/// Starts a transaction that holds SQLite's write lock from its first statement.
///
/// Writers that read before they write (row counts, file lookups) must use this;
/// a deferred transaction cannot upgrade its read snapshot under WAL and fails with
/// `SQLITE_BUSY` instead of waiting on the busy timeout.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}
