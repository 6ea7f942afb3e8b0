//! Read-only API endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::super::AppState;
use super::error_response;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
struct IndexEntry {
    slug: String,
    kind: String,
    path: String,
}

/// List newspapers with their redirect paths.
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    match state.repo.get_all().await {
        Ok(newspapers) => {
            let entries: Vec<_> = newspapers
                .into_iter()
                .map(|p| IndexEntry {
                    path: format!("/{}/", p.slug),
                    kind: p.kind.to_string(),
                    slug: p.slug,
                })
                .collect();
            Json(entries).into_response()
        }
        Err(e) => error_response("Listing newspapers", &e.into()),
    }
}

/// Health report as JSON.
pub async fn admin_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.health.status().await {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response("Building status report", &e),
    }
}
