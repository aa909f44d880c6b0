//! Dashboard Routes (admin only)

use axum::{Json, Router, extract::State, routing::get};
use shared::models::DashboardMetrics;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/dashboard", get(dashboard))
}

async fn dashboard(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<DashboardMetrics>> {
    let metrics = state.metrics().dashboard(&user).await?;
    Ok(Json(metrics))
}
