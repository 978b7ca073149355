//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Este módulo implementa la recolección y agregación de métricas del servidor:
//! - Contadores de requests (total, por código, por ruta)
//! - Latencias (p50, p95, p99) sobre una ventana acotada
//! - Conexiones activas
//!
//! `GET /metrics` las publica junto con el estado del store.

pub mod collector;

pub use collector::{LatencySummary, MetricsCollector, MetricsSnapshot, RouteCount};

use crate::error::ApiResult;
use crate::http::{Response, StatusCode};
use crate::store::SharedStore;
use serde::Serialize;

/// Ocupación de la colección books
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub entries: usize,
    pub capacity: usize,
}

impl StoreStats {
    pub fn from_store(store: &SharedStore) -> Self {
        let guard = store.read();
        Self {
            entries: guard.len(),
            capacity: guard.max_entries(),
        }
    }
}

/// Documento de `/metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    #[serde(flatten)]
    pub server: MetricsSnapshot,
    pub store: StoreStats,
}

/// Handler para `GET /metrics`
pub fn metrics_handler(metrics: &MetricsCollector, store: &SharedStore) -> ApiResult<Response> {
    let report = MetricsReport {
        server: metrics.snapshot(),
        store: StoreStats::from_store(store),
    };
    Ok(Response::json_value(StatusCode::Ok, &report)?.with_header("Cache-Control", "no-store"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::time::Duration;

    #[test]
    fn test_metrics_handler_includes_store() {
        let metrics = MetricsCollector::new();
        metrics.record_request("/books", 200, Duration::from_millis(3));
        let store = SharedStore::new(20);
        store.write().put("dune", json!({"title": "Dune"}));

        let response = metrics_handler(&metrics, &store).unwrap();
        let doc: Value = serde_json::from_slice(response.body()).unwrap();

        assert_eq!(doc["total_requests"], 1);
        assert_eq!(doc["store"]["entries"], 1);
        assert_eq!(doc["store"]["capacity"], 20);
        assert_eq!(doc["top_routes"][0]["route"], "/books");
    }
}
