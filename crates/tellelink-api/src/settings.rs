use axum::{Extension, Json, extract::State};

use tellelink_types::api::{Claims, UserSettings};

use crate::auth::AppState;
use crate::convert::blocking;
use crate::error::ApiError;

/// GET /api/settings. Users without a settings row get the defaults.
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserSettings>, ApiError> {
    let user_id = claims.sub.to_string();
    let enabled = blocking(&state, move |db| db.get_link_shortener_enabled(&user_id)).await?;

    Ok(Json(UserSettings {
        enable_link_shortener: enabled.unwrap_or(false),
    }))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UserSettings>,
) -> Result<Json<UserSettings>, ApiError> {
    let user_id = claims.sub.to_string();
    let enabled = req.enable_link_shortener;
    blocking(&state, move |db| db.upsert_link_shortener_enabled(&user_id, enabled)).await?;

    Ok(Json(UserSettings {
        enable_link_shortener: enabled,
    }))
}
