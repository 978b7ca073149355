//! # Refresco de Consistencia
//! src/refresher/mod.rs
//!
//! Dos threads de fondo mantienen la colección `books` en un estado
//! predecible:
//!
//! - **Reset**: recarga el store desde el dataset base al arrancar y luego
//!   cada `reset_interval` (10 minutos por defecto).
//! - **Live update**: cada `live_update_interval` (10 segundos) reemplaza
//!   las calificaciones recientes de un libro conocido y refresca su fecha,
//!   para que los clientes vean cambios del lado del servidor.
//!
//! Ambos loops están guiados por un `tick` de crossbeam y escuchan un canal
//! de parada: `stop()` (o soltar el `Refresher`) los termina enseguida.

pub mod baseline;

pub use baseline::{Baseline, BaselineError};

use crate::config::Config;
use crate::store::SharedStore;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Calificación que publica el simulador
pub const LIVE_UPDATE_RATING: f64 = 4.6;

#[derive(Debug, Clone)]
pub struct RefresherConfig {
    pub reset_interval: Duration,
    pub live_update_interval: Duration,
    pub live_update_key: String,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            reset_interval: Duration::from_secs(600),
            live_update_interval: Duration::from_secs(10),
            live_update_key: "sapiens".to_string(),
        }
    }
}

impl RefresherConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reset_interval: Duration::from_secs(config.books_reset_secs),
            live_update_interval: Duration::from_secs(config.live_update_secs),
            live_update_key: config.live_update_key.clone(),
        }
    }
}

/// Handle de los threads de refresco
pub struct Refresher {
    stop_tx: Option<Sender<()>>,
    handles: Vec<JoinHandle<()>>,
}

impl Refresher {
    /// Hace el reset inicial (sincrónico) y lanza los dos threads
    pub fn start(
        store: SharedStore,
        baseline: Arc<Baseline>,
        config: RefresherConfig,
    ) -> std::io::Result<Self> {
        reset_to_baseline(&store, &baseline);

        // Nadie envía por este canal: soltar el Sender desconecta a los receptores
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let mut refresher = Self {
            stop_tx: Some(stop_tx),
            handles: Vec::with_capacity(2),
        };

        let reset_handle = {
            let store = store.clone();
            let stop_rx = stop_rx.clone();
            let interval = config.reset_interval;
            thread::Builder::new()
                .name("books-reset".to_string())
                .spawn(move || reset_loop(store, baseline, interval, stop_rx))?
        };
        refresher.handles.push(reset_handle);

        let live_handle = {
            let interval = config.live_update_interval;
            let key = config.live_update_key;
            thread::Builder::new()
                .name("books-live-update".to_string())
                .spawn(move || live_update_loop(store, key, interval, stop_rx))?
        };
        refresher.handles.push(live_handle);

        info!(
            reset_secs = config.reset_interval.as_secs(),
            live_update_secs = config.live_update_interval.as_secs(),
            "refresher iniciado"
        );
        Ok(refresher)
    }

    /// Detiene los threads y espera a que terminen
    pub fn stop(&mut self) {
        let Some(stop_tx) = self.stop_tx.take() else {
            return;
        };
        drop(stop_tx);

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("un thread del refresher terminó con panic");
            }
        }
        info!("refresher detenido");
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reset_loop(store: SharedStore, baseline: Arc<Baseline>, interval: Duration, stop: Receiver<()>) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(stop) -> _ => break,
            recv(ticker) -> _ => {
                reset_to_baseline(&store, &baseline);
            }
        }
    }
    debug!("loop de reset terminado");
}

fn live_update_loop(store: SharedStore, key: String, interval: Duration, stop: Receiver<()>) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(stop) -> _ => break,
            recv(ticker) -> _ => {
                simulate_live_update(&store, &key, Utc::now());
            }
        }
    }
    debug!("loop de live update terminado");
}

/// Recarga el store desde el dataset base
///
/// Retorna las claves que no cupieron bajo el tope.
pub fn reset_to_baseline(store: &SharedStore, baseline: &Baseline) -> Vec<String> {
    let now = Utc::now();
    let (evicted, len) = {
        let mut guard = store.write();
        let evicted = guard.reload(baseline.entries(), now);
        (evicted, guard.len())
    };

    info!(entries = len, "colección books restablecida al dataset base");
    if !evicted.is_empty() {
        info!(evicted = ?evicted, "dataset base excede el tope del store");
    }
    evicted
}

/// Publica una calificación nueva para `key` con fecha `at`
///
/// Retorna `false` si la clave no está (fue borrada o desalojada).
pub fn simulate_live_update(store: &SharedStore, key: &str, at: DateTime<Utc>) -> bool {
    let updated = store.write().update(key, at, |payload| {
        if let Value::Object(book) = payload {
            book.insert(
                "recent_ratings".to_string(),
                json!([{ "date": at, "rating": LIVE_UPDATE_RATING }]),
            );
        }
    });

    if updated {
        debug!(key, "live update aplicado");
    } else {
        debug!(key, "live update omitido, la clave no existe");
    }
    updated
}
