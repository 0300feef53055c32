//! Storage functions for the directory, the ledger and the derived views.
//!
//! Every function takes the pool explicitly; write paths run inside a single
//! transaction so a failure never leaves partial state behind.

pub mod attendance;
pub mod employee;
pub mod summary;

use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::ops::{Deref, DerefMut};
use tracing::warn;

use crate::error::AppError;

/// A transaction that holds the database write lock from its first statement.
///
/// A deferred transaction that reads before it writes cannot upgrade its lock
/// once another writer has committed, and SQLite fails it with `SQLITE_BUSY`
/// rather than waiting. `BEGIN IMMEDIATE` queues on the busy timeout.
///
/// Dropped without [`WriteTx::finish`] (a cancelled request), the connection
/// is detached from the pool and closed, which rolls the transaction back.
pub struct WriteTx {
    conn: Option<PoolConnection<Sqlite>>,
}

const LIVE: &str = "connection is only taken by finish";

impl WriteTx {
    pub async fn begin(pool: &SqlitePool) -> Result<Self, AppError> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        Ok(Self { conn: Some(conn) })
    }

    /// Commits when `result` is `Ok`, rolls back otherwise, and hands `result` back.
    pub async fn finish<T>(mut self, result: Result<T, AppError>) -> Result<T, AppError> {
        let Some(mut conn) = self.conn.take() else {
            return result;
        };

        match result {
            Ok(value) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    warn!(error = %rollback, "Rollback failed, discarding connection");
                    drop(conn.detach());
                }
                Err(e)
            }
        }
    }
}

impl Deref for WriteTx {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        self.conn.as_deref().expect(LIVE)
    }
}

impl DerefMut for WriteTx {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        self.conn.as_deref_mut().expect(LIVE)
    }
}

impl Drop for WriteTx {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            warn!("Write transaction abandoned, closing its connection");
            drop(conn.detach());
        }
    }
}
