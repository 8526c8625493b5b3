use sqlx::SqliteConnection;

use crate::{
    error::Error,
    model::{Shelf, ShelfId},
};

use super::error::DatabaseError;

#[tracing::instrument(name = "get shelves", skip_all)]
pub async fn get_shelves(conn: &mut SqliteConnection) -> Result<Vec<Shelf>, Error> {
    sqlx::query_as::<_, Shelf>(
        r#"
        SELECT
            id, name
        FROM
            shelves
        ORDER BY id
    "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

#[tracing::instrument(name = "insert shelf", skip(conn))]
pub async fn insert_shelf(conn: &mut SqliteConnection, name: &str) -> Result<Shelf, Error> {
    sqlx::query_as::<_, Shelf>(
        r#"
        INSERT INTO shelves
            (name)
        VALUES
            ($1)
        RETURNING id, name;
    "#,
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| Error::Database(DatabaseError::DatabaseError(e)))
}

#[tracing::instrument(name = "rename shelf", skip(conn))]
pub async fn rename_shelf(conn: &mut SqliteConnection, shelf_id: ShelfId, name: &str) -> Result<(), Error> {
    let result = sqlx::query(
        r#"
        UPDATE shelves
        SET
            name = $1
        WHERE
            id = $2;
    "#,
    )
    .bind(name)
    .bind(shelf_id)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Shelf")));
    }

    Ok(())
}

/// Deletes a shelf and unlinks its books. The books themselves stay.
#[tracing::instrument(name = "delete shelf", skip(conn))]
pub async fn delete_shelf(conn: &mut SqliteConnection, shelf_id: ShelfId) -> Result<(), Error> {
    sqlx::query("UPDATE books SET shelf_id = NULL WHERE shelf_id = $1;")
        .bind(shelf_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    let result = sqlx::query("DELETE FROM shelves WHERE id = $1;")
        .bind(shelf_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound("Shelf")));
    }

    Ok(())
}
