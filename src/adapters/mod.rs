//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, blockchain RPC, local keys).
//! Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `api`: Polymarket Data API positions client
//! - `chain`: Polygon RPC and owner key signing via alloy-rs
//! - `metrics`: Prometheus metrics export and health checks

pub mod api;
pub mod chain;
pub mod metrics;
