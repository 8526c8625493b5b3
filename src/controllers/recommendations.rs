use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::{
    db::{acquire, books::load_library},
    error::Error,
    recommendation::Recommendation,
    state::SharedAppState,
};

const DEFAULT_RECOMMENDATION_COUNT: usize = 5;

#[derive(Deserialize, Debug, Default, Validate)]
pub struct RecommendationRequest {
    #[validate(range(min = 1, max = 20))]
    pub count: Option<usize>,
}

#[tracing::instrument(name = "[POST] recommendations", skip_all, fields(count = ?request.count))]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<Vec<Recommendation>>, Error> {
    request.validate().map_err(Error::Validation)?;

    let library = {
        let mut conn = acquire(&app_state.pool).await?;
        load_library(&mut conn).await?
    };
    let recommendations = app_state
        .recommender
        .recommend(
            &library.books,
            request.count.unwrap_or(DEFAULT_RECOMMENDATION_COUNT),
        )
        .await?;

    Ok(Json(recommendations))
}
