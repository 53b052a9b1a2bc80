use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::notification_preference;
use crate::error::AppResult;
use crate::services::PreferenceService;
use crate::utils::jwt::Claims;
use crate::AppState;

/// List the caller's notification preferences
pub async fn list_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<notification_preference::Model>>> {
    let preferences = PreferenceService::new(&state.db).list(claims.sub).await?;
    Ok(Json(preferences))
}

#[derive(Debug, Deserialize)]
pub struct ReplacePreferencesRequest {
    /// Comma-separated city names, e.g. "CityA, CityB".
    pub cities: String,
}

/// Replace the caller's whole city list
pub async fn replace_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReplacePreferencesRequest>,
) -> AppResult<Json<Vec<notification_preference::Model>>> {
    let stored = PreferenceService::new(&state.db)
        .replace_all(claims.sub, &payload.cities)
        .await?;
    Ok(Json(stored))
}

/// Remove one preference (owner only)
pub async fn delete_preference(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(preference_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    PreferenceService::new(&state.db)
        .delete(preference_id, claims.sub)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Notification preference removed." })))
}
