//! Readiness endpoint
//!
//! Liveness (`/health`) comes from `axum_helpers::server::health_router`.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use axum_helpers::server::{run_health_checks, HealthCheckFuture};
use serde_json::Value;

use crate::state::AppState;

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks: Vec<(&str, HealthCheckFuture)> = Vec::new();

    if let Some(db) = &state.db {
        checks.push((
            "database",
            Box::pin(async move {
                database::postgres::check_health(db)
                    .await
                    .map_err(|e| e.to_string())
            }),
        ));
    }

    let (status, Json(mut body)) = match run_health_checks(checks).await {
        Ok(ok) => ok,
        Err(unavailable) => unavailable,
    };

    if let Value::Object(map) = &mut body {
        map.insert("storage".to_string(), Value::from(state.storage()));
    }

    (status, Json(body))
}

/// Create the `/ready` router
pub fn router(state: AppState) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
