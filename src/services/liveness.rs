//! Reachability checks for candidate redirect targets.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

/// Default timeout for a single HEAD request.
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent sent with liveness checks.
pub const USER_AGENT: &str = concat!("newsredirect/", env!("CARGO_PKG_VERSION"));

/// Boolean oracle: is this URL currently served?
///
/// Implementations never fail; anything that is not a successful response
/// counts as unreachable.
#[async_trait]
pub trait LivenessCheck: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}

/// HEAD-based checker.
#[derive(Debug, Clone)]
pub struct HttpLivenessChecker {
    client: Client,
    timeout: Duration,
}

impl HttpLivenessChecker {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_LIVENESS_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl LivenessCheck for HttpLivenessChecker {
    async fn is_reachable(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!("HEAD {} -> {}", url, status);
                // Redirects are followed; what is left below 400 is served
                status.as_u16() < 400
            }
            Err(e) => {
                tracing::debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/ok/index.html", get(|| async { "issue" }))
            .route("/gone", get(|| async { StatusCode::GONE }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_reachable_and_missing() {
        let base = spawn_server().await;
        let checker = HttpLivenessChecker::with_timeout(Duration::from_secs(2)).unwrap();

        assert!(checker.is_reachable(&format!("{}/ok/index.html", base)).await);
        assert!(!checker.is_reachable(&format!("{}/missing", base)).await);
        assert!(!checker.is_reachable(&format!("{}/gone", base)).await);
    }

    #[tokio::test]
    async fn test_transport_error_is_unreachable() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let checker = HttpLivenessChecker::with_timeout(Duration::from_secs(2)).unwrap();
        assert!(!checker.is_reachable(&format!("http://{}/x", addr)).await);
        assert!(!checker.is_reachable("not a url").await);
    }
}
