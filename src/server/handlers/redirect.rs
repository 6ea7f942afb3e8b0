//! Per-newspaper redirect endpoint.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::super::AppState;
use super::APPLICATION_ERROR;
use crate::models::Newspaper;
use crate::services::{effective_sequence_id, NewspaperError};

/// Redirect to today's target. Works before the daily job has run: sequence
/// newspapers go through the cutover resolver.
pub async fn redirect_newspaper(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    let newspaper = match state.repo.find_by_slug(&slug).await {
        Ok(Some(newspaper)) => newspaper,
        Ok(None) => return (StatusCode::NOT_FOUND, "Newspaper not found").into_response(),
        Err(e) => {
            tracing::error!("Loading newspaper {}: {}", slug, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, APPLICATION_ERROR).into_response();
        }
    };

    match target_for(&state, &newspaper).await {
        Ok(url) => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
        Err(e) => {
            tracing::error!("Building redirect for {}: {}", slug, e);
            (StatusCode::INTERNAL_SERVER_ERROR, APPLICATION_ERROR).into_response()
        }
    }
}

async fn target_for(state: &AppState, newspaper: &Newspaper) -> Result<String, NewspaperError> {
    let now = state.clock.now();
    let sequence_id = if newspaper.is_sequence() {
        Some(effective_sequence_id(newspaper, &now)?)
    } else {
        None
    };
    state.builder.build_for(newspaper, &now, sequence_id).await
}
