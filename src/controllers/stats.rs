use axum::{Json, extract::State};

use crate::{
    db::{acquire, books::load_library},
    error::Error,
    library::stats::Statistics,
    state::SharedAppState,
};

use super::today;

#[tracing::instrument(name = "[GET] stats", skip_all)]
pub async fn index(State(app_state): State<SharedAppState>) -> Result<Json<Statistics>, Error> {
    let mut conn = acquire(&app_state.pool).await?;
    let library = load_library(&mut conn).await?;

    Ok(Json(Statistics::compute(&library.books, today())))
}
