//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum 0.7 for Docker
//! health checks and monitoring. Readiness tracks whether the most
//! recent cycle managed to reach the RPC endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Shared health state updated by the scheduler.
#[derive(Debug, Default)]
pub struct HealthState {
    /// Whether the last cycle connected to the RPC endpoint.
    rpc_reachable: AtomicBool,
    /// Cycles finished since startup.
    cycles_completed: AtomicU64,
}

impl HealthState {
    /// Not ready until the first cycle connects.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle(&self, rpc_reachable: bool) {
        self.rpc_reachable.store(rpc_reachable, Ordering::Relaxed);
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Relaxed)
    }

    pub fn is_ready(&self) -> bool {
        self.rpc_reachable.load(Ordering::Relaxed)
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    /// Health state shared with the scheduler.
    state: Arc<HealthState>,
    /// Bind port (default 8080 from config).
    port: u16,
}

impl HealthServer {
    /// Create a new health server.
    pub const fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    fn router(state: Arc<HealthState>) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(state)
    }

    /// Start the health check server in the background.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Self::router(Arc::clone(&self.state));

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: 200 only if the last cycle reached the RPC.
    async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
        if state.is_ready() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_follows_last_cycle() {
        let state = HealthState::new();
        assert!(!state.is_ready());

        state.record_cycle(true);
        assert!(state.is_ready());

        state.record_cycle(false);
        assert!(!state.is_ready());
        assert_eq!(state.cycles_completed(), 2);
    }

    #[tokio::test]
    async fn test_health_endpoints_over_http() {
        let state = Arc::new(HealthState::new());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = HealthServer::router(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base = format!("http://{addr}");
        let live = reqwest::get(format!("{base}/live")).await.unwrap();
        assert_eq!(live.status(), reqwest::StatusCode::OK);

        let ready = reqwest::get(format!("{base}/ready")).await.unwrap();
        assert_eq!(ready.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

        state.record_cycle(true);
        let ready = reqwest::get(format!("{base}/ready")).await.unwrap();
        assert_eq!(ready.status(), reqwest::StatusCode::OK);
    }
}
