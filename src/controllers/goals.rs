use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    db::{
        acquire, begin_write,
        books::load_library,
        error::DatabaseError,
        goals::{get_goal, save_goal, sync_goal},
    },
    error::Error,
    library::goal,
    model::ReadingGoal,
    state::SharedAppState,
};

#[derive(Deserialize, Debug)]
pub struct YearPath {
    pub year: i32,
}

#[derive(Deserialize, Debug, Validate)]
pub struct GoalRequest {
    #[validate(range(min = 1, max = 10000))]
    pub target: u32,
}

/// Returns the goal of a year with `current` recounted from the collection.
/// Nothing is stored; a year without a goal reports the default target.
#[tracing::instrument(name = "[GET] goals/{year}", skip_all, fields(path.year = path.year))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<YearPath>,
) -> Result<Json<ReadingGoal>, Error> {
    let mut conn = acquire(&app_state.pool).await?;
    let existing = get_goal(&mut conn, path.year).await?;
    let library = load_library(&mut conn).await?;

    Ok(Json(goal::sync(path.year, &library.books, existing)))
}

#[tracing::instrument(name = "[PUT] goals/{year}", skip_all, fields(path.year = path.year))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<YearPath>,
    Json(request): Json<GoalRequest>,
) -> Result<Json<ReadingGoal>, Error> {
    request.validate().map_err(Error::Validation)?;

    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    let existing = ReadingGoal {
        year: path.year,
        target: request.target,
        current: 0,
    };
    let goal = goal::sync(path.year, &library.books, Some(existing));
    save_goal(&mut tx, &goal).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(Json(goal))
}

#[tracing::instrument(name = "[POST] goals/{year}/sync", skip_all, fields(path.year = path.year))]
pub async fn sync(
    State(app_state): State<SharedAppState>,
    Path(path): Path<YearPath>,
) -> Result<Json<ReadingGoal>, Error> {
    let mut tx = begin_write(&app_state.pool).await?;
    let library = load_library(&mut tx).await?;
    let goal = sync_goal(&mut tx, path.year, &library.books).await?;
    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(Json(goal))
}
