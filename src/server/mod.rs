//! Web server for newspaper redirects.
//!
//! Serves:
//! - `/{slug}/` redirects to today's edition
//! - a JSON index and health check
//! - admin endpoints to inspect status and correct issue ids

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::clock::CivilClock;
use crate::config::Settings;
use crate::repository::{DbContext, NewspaperRepository};
use crate::services::{HealthService, IssueAdmin, RedirectBuilder};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<NewspaperRepository>,
    pub builder: Arc<RedirectBuilder>,
    pub health: Arc<HealthService>,
    pub admin: Arc<IssueAdmin>,
    pub clock: CivilClock,
    /// Bearer token for `/admin`; `None` leaves the admin routes open.
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self::from_context(&settings.create_db_context(), settings.admin_token.as_deref())
    }

    /// Wire every service against one database context.
    pub fn from_context(ctx: &DbContext, admin_token: Option<&str>) -> Self {
        let repo = ctx.newspapers();
        Self {
            builder: Arc::new(RedirectBuilder::new(repo.clone())),
            health: Arc::new(HealthService::new(repo.clone(), ctx.clock())),
            admin: Arc::new(IssueAdmin::new(repo.clone())),
            repo: Arc::new(repo),
            clock: ctx.clock(),
            admin_token: admin_token.map(Arc::from),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::clock::DEFAULT_TIMEZONE;
    use crate::models::{NewspaperKind, NewspaperSeed};

    /// App frozen at the given civil hour on 2025-01-15, with a few newspapers.
    async fn setup_test_app(
        civil_hour: u32,
        admin_token: Option<&str>,
    ) -> (axum::Router, DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let instant = DEFAULT_TIMEZONE
            .with_ymd_and_hms(2025, 1, 15, civil_hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let clock = CivilClock::frozen_at(DEFAULT_TIMEZONE, instant);
        let ctx = DbContext::from_path(&dir.path().join("test.db"), clock);
        ctx.init_schema().await.unwrap();

        let repo = ctx.newspapers();
        repo.create(
            &NewspaperSeed::sequence("arabnews", "https://example.com/pdf", 11)
                .with_cutover_hour(8)
                .with_last_increment_date(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()),
        )
        .await
        .unwrap();
        repo.create(&NewspaperSeed::patterned(
            "okaz",
            NewspaperKind::Date,
            "https://x/{Y}/{m}/{d}/index.html",
        ))
        .await
        .unwrap();
        repo.create(&NewspaperSeed::patterned("broken", NewspaperKind::Monthly, ""))
            .await
            .unwrap();

        let app = create_router(AppState::from_context(&ctx, admin_token));
        (app, ctx, dir)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _ctx, _dir) = setup_test_app(10, None).await;
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_index_lists_redirect_paths() {
        let (app, _ctx, _dir) = setup_test_app(10, None).await;
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["slug"], "arabnews");
        assert_eq!(entries[0]["kind"], "sequence");
        assert_eq!(entries[0]["path"], "/arabnews/");
    }

    #[tokio::test]
    async fn test_redirect_before_cutover_shows_previous_issue() {
        let (app, ctx, _dir) = setup_test_app(6, None).await;
        let response = app.oneshot(get("/arabnews/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location(&response),
            "https://example.com/pdf/10/index.html"
        );

        let stored = ctx.newspapers().find_by_slug("arabnews").await.unwrap().unwrap();
        assert_eq!(
            stored.last_redirect_url.as_deref(),
            Some("https://example.com/pdf/10/index.html")
        );
        assert_eq!(stored.local_latest_id, Some(11));
    }

    #[tokio::test]
    async fn test_redirect_after_cutover_and_date_kind() {
        let (app, _ctx, _dir) = setup_test_app(9, None).await;

        let response = app.clone().oneshot(get("/arabnews")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location(&response),
            "https://example.com/pdf/11/index.html"
        );

        let response = app.oneshot(get("/okaz/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "https://x/2025/01/15/index.html");
    }

    #[tokio::test]
    async fn test_redirect_errors() {
        let (app, _ctx, _dir) = setup_test_app(9, None).await;

        let response = app.clone().oneshot(get("/nope/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/broken/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Application error.");
    }

    #[tokio::test]
    async fn test_admin_adjustments() {
        let (app, _ctx, _dir) = setup_test_app(9, None).await;

        let response = app
            .clone()
            .oneshot(post("/admin/newspapers/arabnews/increment", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["local_latest_id"], 12);

        let response = app
            .clone()
            .oneshot(post("/admin/newspapers/arabnews/decrement", None, None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["local_latest_id"], 11);

        let response = app
            .clone()
            .oneshot(post(
                "/admin/newspapers/arabnews/set",
                None,
                Some(r#"{"value": -4}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["local_latest_id"], 0);

        let response = app
            .clone()
            .oneshot(post("/admin/newspapers/okaz/increment", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(post("/admin/newspapers/ghost/increment", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_token_is_enforced() {
        let (app, _ctx, _dir) = setup_test_app(9, Some("s3cret")).await;

        let response = app
            .clone()
            .oneshot(post("/admin/newspapers/arabnews/increment", Some("wrong"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // A prefix of the token is not the token
        let response = app
            .clone()
            .oneshot(post("/admin/newspapers/arabnews/increment", Some("s3cre"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.clone().oneshot(get("/admin/status.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(post("/admin/newspapers/arabnews/increment", Some("s3cret"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Public routes stay open
        let response = app.oneshot(get("/okaz/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_admin_status_report() {
        let (app, _ctx, _dir) = setup_test_app(9, None).await;
        let response = app.oneshot(get("/admin/status.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["newspaper_count"], 3);
        assert!(json["sequence_pending"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cors_headers_only_on_public_routes() {
        let (app, _ctx, _dir) = setup_test_app(9, None).await;
        let with_origin = |uri: &str| {
            Request::builder()
                .uri(uri)
                .header(header::ORIGIN, "https://reader.example")
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(with_origin("/health")).await.unwrap();
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

        let response = app.oneshot(with_origin("/admin/status.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
