pub mod articles;
pub mod books;
pub mod error;
pub mod goals;
pub mod profile;
pub mod reviews;
pub mod shelves;

use sqlx::{SqlitePool, pool::PoolConnection};

use crate::error::Error;

use self::error::DatabaseError;

pub type SqliteTransaction<'a> = sqlx::Transaction<'a, sqlx::Sqlite>;

/// Starts a transaction that holds the SQLite write lock from its first
/// statement, so a snapshot loaded inside it stays current until commit.
pub async fn begin_write(pool: &SqlitePool) -> Result<SqliteTransaction<'static>, Error> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

pub async fn acquire(pool: &SqlitePool) -> Result<PoolConnection<sqlx::Sqlite>, Error> {
    pool.acquire()
        .await
        .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}
