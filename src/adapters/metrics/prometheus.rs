//! Prometheus Metrics Registry - Redemption Observability
//!
//! Registers and exposes Prometheus metrics for Grafana dashboards.
//! Covers cycle results, per-claim outcomes, gas fallbacks, discovery
//! size and the last observed gas price.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

/// Centralized Prometheus metrics for the auto-claim bot.
///
/// All metrics follow the naming convention `auto_claim_*`.
pub struct RedeemMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Cycles by result (`ok`, `connectivity`, `credential`, `panic`, `error`).
    pub cycles: IntCounterVec,
    /// Claims by outcome (`redeemed`, `reverted`, `timed_out`, `dry_run`,
    /// or an error kind).
    pub claims: IntCounterVec,
    /// Gas estimations that fell back to the fixed limit.
    pub gas_fallbacks: IntCounter,
    /// Redeemable positions found by the last discovery.
    pub positions_discovered: IntGauge,
    /// Last observed gas price (gwei).
    pub gas_price_gwei: Gauge,
    /// Unix timestamp of the last finished cycle.
    pub last_cycle_timestamp: IntGauge,
}

impl RedeemMetrics {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cycles = IntCounterVec::new(
            Opts::new("auto_claim_cycles_total", "Claim cycles by result"),
            &["result"],
        )?;

        let claims = IntCounterVec::new(
            Opts::new("auto_claim_claims_total", "Redemption attempts by outcome"),
            &["outcome"],
        )?;

        let gas_fallbacks = IntCounter::new(
            "auto_claim_gas_fallback_total",
            "Gas estimations replaced by the fallback limit",
        )?;

        let positions_discovered = IntGauge::new(
            "auto_claim_positions_discovered",
            "Redeemable positions found by the last discovery",
        )?;

        let gas_price_gwei = Gauge::new(
            "auto_claim_gas_price_gwei",
            "Last observed Polygon gas price in gwei",
        )?;

        let last_cycle_timestamp = IntGauge::new(
            "auto_claim_last_cycle_timestamp",
            "Unix timestamp of the last finished cycle",
        )?;

        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(claims.clone()))?;
        registry.register(Box::new(gas_fallbacks.clone()))?;
        registry.register(Box::new(positions_discovered.clone()))?;
        registry.register(Box::new(gas_price_gwei.clone()))?;
        registry.register(Box::new(last_cycle_timestamp.clone()))?;

        Ok(Self {
            registry,
            cycles,
            claims,
            gas_fallbacks,
            positions_discovered,
            gas_price_gwei,
            last_cycle_timestamp,
        })
    }

    pub fn record_cycle(&self, result: &str, finished_at: i64) {
        self.cycles.with_label_values(&[result]).inc();
        self.last_cycle_timestamp.set(finished_at);
    }

    pub fn record_claim(&self, outcome: &str) {
        self.claims.with_label_values(&[outcome]).inc();
    }

    pub fn record_gas_fallback(&self) {
        self.gas_fallbacks.inc();
    }

    pub fn set_positions_discovered(&self, count: usize) {
        self.positions_discovered
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Record a gas price given in wei.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_gas_price_wei(&self, wei: u128) {
        self.gas_price_gwei.set(wei as f64 / 1e9);
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move { metrics.render() }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
