//! Issue administration endpoints.

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use super::super::AppState;
use super::error_response;

#[derive(Debug, Deserialize)]
pub struct SetIssueBody {
    pub value: i64,
}

/// Reject admin requests without the configured bearer token.
///
/// Without a configured token every request passes.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_token.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let accepted = provided.is_some_and(|p| bool::from(p.as_bytes().ct_eq(expected.as_bytes())));
    if accepted {
        next.run(request).await
    } else {
        tracing::warn!("Rejected admin request to {}", request.uri().path());
        StatusCode::UNAUTHORIZED.into_response()
    }
}

pub async fn increment_issue(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    adjust(&state, &slug, 1).await
}

pub async fn decrement_issue(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    adjust(&state, &slug, -1).await
}

pub async fn set_issue(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<SetIssueBody>,
) -> Response {
    match state.admin.set_latest_id(&slug, body.value).await {
        Ok(newspaper) => Json(newspaper).into_response(),
        Err(e) => error_response(&format!("Setting issue for {}", slug), &e),
    }
}

async fn adjust(state: &AppState, slug: &str, delta: i64) -> Response {
    match state.admin.adjust_latest_id(slug, delta).await {
        Ok(newspaper) => Json(newspaper).into_response(),
        Err(e) => error_response(&format!("Adjusting issue for {}", slug), &e),
    }
}
