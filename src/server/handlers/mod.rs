//! HTTP request handlers for the web server.

mod admin;
mod api;
mod redirect;

// Re-export handlers for use by the router
pub use admin::{decrement_issue, increment_issue, require_admin_token, set_issue};
pub use api::{admin_status, health, index};
pub use redirect::redirect_newspaper;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::NewspaperError;

/// Body of every 500 response. Internal error text never leaves the server.
pub const APPLICATION_ERROR: &str = "Application error.";

/// Map a service error onto a response, logging what the client won't see.
pub(crate) fn error_response(context: &str, err: &NewspaperError) -> Response {
    match err {
        NewspaperError::NotFound(_) | NewspaperError::NotAdjustable(_) => {
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        _ => {
            tracing::error!("{}: {}", context, err);
            (StatusCode::INTERNAL_SERVER_ERROR, APPLICATION_ERROR).into_response()
        }
    }
}
