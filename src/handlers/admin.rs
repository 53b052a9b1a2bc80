use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::RideService;
use crate::AppState;

/// Remove a ride outright (admin override); its bookings cascade
pub async fn delete_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    RideService::new(&state.db).delete(ride_id).await?;
    Ok(Json(serde_json::json!({ "message": "Ride deleted." })))
}
