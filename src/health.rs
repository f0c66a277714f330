use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::{error::now_rfc3339, state::AppState, store::Store};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: f64, // seconds
    pub environment: String,
    pub database: &'static str,
}

/// Always 200; a failing store only shows up in `database`.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(error = %e, "store ping failed");
            "disconnected"
        }
    };
    Json(HealthResponse {
        status: "OK",
        timestamp: now_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.environment.clone(),
        database,
    })
}

pub async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Taskboard API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth",
            "users": "/api/users",
            "tasks": "/api/tasks",
        }
    }))
}
