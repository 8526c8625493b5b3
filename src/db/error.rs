#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    DatabaseError(#[source] sqlx::Error),
    #[error("Migration error: {0}")]
    MigrationError(#[source] sqlx::migrate::MigrateError),
    #[error("{0} not found")]
    NotFound(&'static str),
}
