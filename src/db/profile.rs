use sqlx::SqlitePool;

use crate::{error::Error, model::Profile};

use super::error::DatabaseError;

#[tracing::instrument(name = "get profile", skip_all)]
pub async fn get_profile(pool: &SqlitePool) -> Result<Profile, Error> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT
            display_name, bio, avatar_url
        FROM
            profile
        WHERE
            id = 1;
    "#,
    )
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(profile.unwrap_or_default())
}

#[tracing::instrument(name = "save profile", skip_all)]
pub async fn save_profile(pool: &SqlitePool, profile: &Profile) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO profile
            (id, display_name, bio, avatar_url)
        VALUES
            (1, $1, $2, $3)
        ON CONFLICT (id)
        DO UPDATE SET
            display_name = EXCLUDED.display_name,
            bio = EXCLUDED.bio,
            avatar_url = EXCLUDED.avatar_url;
    "#,
    )
    .bind(&profile.display_name)
    .bind(&profile.bio)
    .bind(&profile.avatar_url)
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}
