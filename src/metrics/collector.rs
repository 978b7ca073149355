//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del servidor en tiempo real.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Latencias guardadas para calcular percentiles
pub const DEFAULT_LATENCY_WINDOW: usize = 10_000;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
    started_at: DateTime<Utc>,
}

/// Datos internos de métricas
struct MetricsData {
    total_requests: u64,

    /// Requests por código de estado
    status_codes: HashMap<u16, u64>,

    /// Últimas latencias (microsegundos), la más vieja al frente
    latencies: VecDeque<u64>,
    max_latencies: usize,

    /// Requests por patrón de ruta (`/books/{id}`, no el path concreto)
    requests_per_route: HashMap<String, u64>,

    active_connections: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_LATENCY_WINDOW)
    }

    pub fn with_window(max_latencies: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                total_requests: 0,
                status_codes: HashMap::new(),
                latencies: VecDeque::with_capacity(max_latencies.min(DEFAULT_LATENCY_WINDOW)),
                max_latencies,
                requests_per_route: HashMap::new(),
                active_connections: 0,
            })),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Registra un request terminado
    pub fn record_request(&self, route: &str, status_code: u16, latency: Duration) {
        let mut data = self.inner.lock();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;

        if data.max_latencies > 0 {
            if data.latencies.len() >= data.max_latencies {
                data.latencies.pop_front();
            }
            data.latencies.push_back(latency.as_micros() as u64);
        }

        *data.requests_per_route.entry(route.to_string()).or_insert(0) += 1;
    }

    pub fn increment_active_connections(&self) {
        self.inner.lock().active_connections += 1;
    }

    pub fn decrement_active_connections(&self) {
        let mut data = self.inner.lock();
        data.active_connections = data.active_connections.saturating_sub(1);
    }

    pub fn active_connections(&self) -> u64 {
        self.inner.lock().active_connections
    }

    /// Obtiene un snapshot de las métricas
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.inner.lock();
        let latency = LatencySummary::from_samples(data.latencies.iter().copied());

        let status_codes = data
            .status_codes
            .iter()
            .map(|(code, count)| (code.to_string(), *count))
            .collect();

        // Top 10 rutas más accedidas
        let mut routes: Vec<RouteCount> = data
            .requests_per_route
            .iter()
            .map(|(route, count)| RouteCount {
                route: route.clone(),
                count: *count,
            })
            .collect();
        routes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.route.cmp(&b.route)));
        routes.truncate(10);

        MetricsSnapshot {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            started_at: self.started_at,
            total_requests: data.total_requests,
            active_connections: data.active_connections,
            status_codes,
            top_routes: routes,
            latency_us: latency,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot de métricas (para uso externo y `/metrics`)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub total_requests: u64,
    pub active_connections: u64,
    pub status_codes: BTreeMap<String, u64>,
    pub top_routes: Vec<RouteCount>,
    pub latency_us: LatencySummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCount {
    pub route: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub avg: u64,
    pub stddev: f64,
    pub samples: usize,
}

impl LatencySummary {
    fn from_samples(samples: impl Iterator<Item = u64>) -> Self {
        let mut sorted: Vec<u64> = samples.collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_unstable();

        let len = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let avg = sum / len as u64;

        let variance = sorted
            .iter()
            .map(|&x| {
                let diff = x as f64 - avg as f64;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;

        Self {
            p50: sorted[len * 50 / 100],
            p95: sorted[len * 95 / 100],
            p99: sorted[len * 99 / 100],
            avg,
            stddev: variance.sqrt(),
            samples: len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector() {
        let collector = MetricsCollector::new();

        collector.record_request("/books", 200, Duration::from_millis(10));
        collector.record_request("/books", 200, Duration::from_millis(20));
        collector.record_request("/books/{id}", 404, Duration::from_millis(5));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.status_codes.get("200"), Some(&2));
        assert_eq!(snapshot.status_codes.get("404"), Some(&1));
    }

    #[test]
    fn test_percentiles() {
        let collector = MetricsCollector::new();

        for i in 1..=100 {
            collector.record_request("/test", 200, Duration::from_micros(i));
        }

        let latency = collector.snapshot().latency_us;
        assert!(latency.p50 > 0);
        assert!(latency.p95 > latency.p50);
        assert!(latency.p99 > latency.p95);
        assert_eq!(latency.samples, 100);
    }

    #[test]
    fn test_empty_latencies() {
        let snapshot = MetricsCollector::new().snapshot();
        assert_eq!(snapshot.latency_us, LatencySummary::default());
    }

    #[test]
    fn test_active_connections_tracking() {
        let collector = MetricsCollector::new();

        assert_eq!(collector.active_connections(), 0);
        collector.increment_active_connections();
        collector.increment_active_connections();
        assert_eq!(collector.active_connections(), 2);
        collector.decrement_active_connections();
        assert_eq!(collector.active_connections(), 1);
    }

    #[test]
    fn test_active_connections_no_negative() {
        let collector = MetricsCollector::new();

        collector.decrement_active_connections();
        collector.decrement_active_connections();

        assert_eq!(collector.active_connections(), 0);
    }

    #[test]
    fn test_top_routes_sorted() {
        let collector = MetricsCollector::new();

        collector.record_request("/books/{id}", 200, Duration::from_millis(10));
        collector.record_request("/books/{id}", 304, Duration::from_millis(15));
        collector.record_request("/books", 200, Duration::from_millis(5));

        let routes = collector.snapshot().top_routes;
        assert_eq!(routes[0], RouteCount { route: "/books/{id}".into(), count: 2 });
        assert_eq!(routes[1], RouteCount { route: "/books".into(), count: 1 });
    }

    #[test]
    fn test_latency_window_management() {
        let collector = MetricsCollector::with_window(100);

        for i in 0..1500 {
            collector.record_request("/test", 200, Duration::from_micros(i));
        }

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.total_requests, 1500);
        assert_eq!(snapshot.latency_us.samples, 100);
        // Solo quedan las últimas 100 (1400..1500)
        assert!(snapshot.latency_us.p50 >= 1400);
    }

    #[test]
    fn test_snapshot_serializes() {
        let collector = MetricsCollector::new();
        collector.record_request("/", 200, Duration::from_millis(1));

        let json = serde_json::to_value(collector.snapshot()).unwrap();
        assert_eq!(json["total_requests"], 1);
        assert!(json["latency_us"]["p99"].is_u64());
        assert!(json["started_at"].is_string());
    }

    #[test]
    fn test_clones_share_data() {
        let collector = MetricsCollector::new();
        let clone = collector.clone();
        clone.record_request("/", 200, Duration::from_millis(1));
        assert_eq!(collector.snapshot().total_requests, 1);
    }
}
