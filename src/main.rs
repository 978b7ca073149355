//! # apibin - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor: parsea la configuración (CLI + entorno),
//! inicializa el logging y arranca el servicio.

use apibin::config::Config;
use apibin::logging;

fn main() {
    let config = Config::new();

    if let Err(e) = logging::init(config.log_format) {
        eprintln!("Error fatal: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = apibin::run(config) {
        tracing::error!(error = %e, "error fatal");
        std::process::exit(1);
    }
}
