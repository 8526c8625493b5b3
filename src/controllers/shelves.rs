use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    db::{
        acquire, begin_write,
        books::load_library,
        error::DatabaseError,
        shelves::{delete_shelf, get_shelves, insert_shelf, rename_shelf},
    },
    error::Error,
    library::Change,
    model::Shelf,
    state::SharedAppState,
};

use super::IdPath;

#[derive(Deserialize, Debug, Validate)]
pub struct ShelfRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[tracing::instrument(name = "[GET] shelves", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Vec<Shelf>>, Error> {
    let mut conn = acquire(&app_state.pool).await?;
    let shelves = get_shelves(&mut conn).await?;

    Ok(Json(shelves))
}

#[tracing::instrument(name = "[POST] shelves", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<ShelfRequest>,
) -> Result<(StatusCode, Json<Shelf>), Error> {
    request.validate().map_err(Error::Validation)?;

    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    let (library, _) = library.apply(Change::AddShelf(Shelf {
        id: 0,
        name: request.name,
    }))?;

    let name = library
        .shelves
        .last()
        .map(|shelf| shelf.name.clone())
        .ok_or_else(|| Error::Other(anyhow::anyhow!("added shelf missing from library")))?;
    let shelf = insert_shelf(&mut tx, &name).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok((StatusCode::CREATED, Json(shelf)))
}

#[tracing::instrument(name = "[PATCH] shelves/{id}", skip_all, fields(path.id = path.id))]
pub async fn rename(
    State(app_state): State<SharedAppState>,
    Path(path): Path<IdPath>,
    Json(request): Json<ShelfRequest>,
) -> Result<Json<Shelf>, Error> {
    request.validate().map_err(Error::Validation)?;

    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    let (library, _) = library.apply(Change::RenameShelf {
        id: path.id,
        name: request.name,
    })?;

    let shelf = library.shelf(path.id)?.clone();
    rename_shelf(&mut tx, shelf.id, &shelf.name).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(Json(shelf))
}

#[tracing::instrument(name = "[DELETE] shelves/{id}", skip_all, fields(path.id = path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Path(path): Path<IdPath>,
) -> Result<StatusCode, Error> {
    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    library.apply(Change::DeleteShelf(path.id))?;

    delete_shelf(&mut tx, path.id).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(StatusCode::NO_CONTENT)
}
