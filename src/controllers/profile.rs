use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::{
    db::profile::{get_profile, save_profile},
    error::Error,
    model::Profile,
    state::SharedAppState,
};

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[tracing::instrument(name = "[GET] profile", skip_all)]
pub async fn show(State(app_state): State<SharedAppState>) -> Result<Json<Profile>, Error> {
    let profile = get_profile(&app_state.pool).await?;

    Ok(Json(profile))
}

#[tracing::instrument(name = "[PUT] profile", skip_all)]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<Profile>, Error> {
    request.validate().map_err(Error::Validation)?;

    let profile = Profile {
        display_name: blank_to_none(request.display_name),
        bio: blank_to_none(request.bio),
        avatar_url: blank_to_none(request.avatar_url),
    };
    save_profile(&app_state.pool, &profile).await?;

    Ok(Json(profile))
}
