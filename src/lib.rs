//! # apibin
//! src/lib.rs
//!
//! API HTTP de ejemplo implementada desde cero sobre `std::net`. La mayoría
//! de los endpoints hacen echo o sirven ejemplos estáticos; la parte con
//! sustancia es la colección `books`: un store acotado y ordenado,
//! compartido entre threads, con versiones derivadas del contenido (ETags) y
//! peticiones condicionales (`If-Match`, `If-None-Match`,
//! `If-Modified-Since`, `If-Unmodified-Since`).
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing de requests, construcción de responses, fechas HTTP
//! - `server`: Servidor TCP, un thread por conexión
//! - `router`: Enrutamiento método + patrón a handlers
//! - `commands`: Echo y respuestas de ejemplo
//! - `books`: Handlers y tipos de la colección versionada
//! - `store`: Store ordenado y acotado detrás de un `RwLock`
//! - `conditional`: Evaluación de precondiciones
//! - `fingerprint`: ETags derivados del contenido
//! - `refresher`: Reset periódico y actualizaciones simuladas
//! - `metrics`: Recolección de métricas y observabilidad
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use apibin::config::Config;
//!
//! let config = Config::default();
//! apibin::run(config).expect("Error al iniciar servidor");
//! ```

pub mod books;
pub mod commands;
pub mod conditional;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod refresher;
pub mod router;
pub mod server;
pub mod store;

use config::Config;
use error::StartupError;
use refresher::{Baseline, Refresher, RefresherConfig};
use server::Server;
use std::sync::Arc;
use store::SharedStore;
use tracing::info;

/// Arranca el servicio completo y bloquea atendiendo conexiones
///
/// El logging debe estar inicializado antes (ver `logging::init`).
pub fn run(config: Config) -> Result<(), StartupError> {
    config.validate()?;
    config.print_summary();

    let baseline = Arc::new(Baseline::embedded()?);
    info!(books = baseline.len(), "dataset base cargado");

    let store = SharedStore::new(config.books_max);
    let refresher_config = RefresherConfig::from_config(&config);
    let _refresher = Refresher::start(store.clone(), baseline, refresher_config)?;

    let server = Server::new(&config, store);
    server.run()?;
    Ok(())
}
