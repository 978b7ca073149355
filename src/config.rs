//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor HTTP con soporte completo
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./apibin --port 8080 \
//!   --books-max 50 \
//!   --books-reset-secs 300 \
//!   --log-format json
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 RUST_LOG=apibin=debug ./apibin
//! ```

use clap::{Parser, ValueEnum};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Formato de salida de los logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Legible para humanos
    #[default]
    Text,
    /// Una línea JSON por evento
    Json,
}

/// Valores de configuración inválidos
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be > 0")]
    Zero(&'static str),

    #[error("live update interval ({live}s) must be shorter than the reset interval ({reset}s)")]
    LiveUpdateTooSlow { live: u64, reset: u64 },

    #[error("live update key must not be empty")]
    EmptyLiveUpdateKey,
}

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "apibin")]
#[command(about = "API de ejemplo con echo, respuestas cacheables y una colección books con ETags")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8888", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    // === Colección books ===

    /// Máximo de libros; al superarlo se desalojan los más viejos
    #[arg(long = "books-max", default_value = "20", env = "BOOKS_MAX")]
    pub books_max: usize,

    /// Cada cuántos segundos se restablece el dataset base
    #[arg(long = "books-reset-secs", default_value = "600", env = "BOOKS_RESET_SECS")]
    pub books_reset_secs: u64,

    /// Cada cuántos segundos se simula una actualización del servidor
    #[arg(long = "live-update-secs", default_value = "10", env = "LIVE_UPDATE_SECS")]
    pub live_update_secs: u64,

    /// Libro que recibe las actualizaciones simuladas
    #[arg(long = "live-update-key", default_value = "sapiens", env = "LIVE_UPDATE_KEY")]
    pub live_update_key: String,

    // === Conexiones ===

    /// Timeout de lectura del socket en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "5000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura del socket en milisegundos
    #[arg(long = "write-timeout-ms", default_value = "10000", env = "WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,

    /// Tamaño máximo del body; más grande → 413
    #[arg(long = "max-body-bytes", default_value = "1048576", env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Tamaño mínimo de body para comprimir con gzip
    #[arg(long = "gzip-min-bytes", default_value = "1024", env = "GZIP_MIN_BYTES")]
    pub gzip_min_bytes: usize,

    // === Observabilidad ===

    /// Formato de los logs (el nivel se controla con RUST_LOG)
    #[arg(long = "log-format", value_enum, default_value = "text", env = "LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use apibin::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8888");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Valida la configuración
    ///
    /// `books_max = 0` es válido: cada escritura se desaloja a sí misma.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.books_reset_secs == 0 {
            return Err(ConfigError::Zero("books reset interval"));
        }
        if self.live_update_secs == 0 {
            return Err(ConfigError::Zero("live update interval"));
        }
        if self.live_update_secs >= self.books_reset_secs {
            return Err(ConfigError::LiveUpdateTooSlow {
                live: self.live_update_secs,
                reset: self.books_reset_secs,
            });
        }
        if self.live_update_key.trim().is_empty() {
            return Err(ConfigError::EmptyLiveUpdateKey);
        }

        if self.read_timeout_ms == 0 {
            return Err(ConfigError::Zero("read timeout"));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::Zero("write timeout"));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Zero("max body bytes"));
        }

        Ok(())
    }

    /// Emite un resumen de la configuración en el log
    pub fn print_summary(&self) {
        info!(address = %self.address(), "red");
        info!(
            max = self.books_max,
            reset_secs = self.books_reset_secs,
            live_update_secs = self.live_update_secs,
            live_update_key = %self.live_update_key,
            "colección books"
        );
        info!(
            read_timeout_ms = self.read_timeout_ms,
            write_timeout_ms = self.write_timeout_ms,
            max_body_bytes = self.max_body_bytes,
            gzip_min_bytes = self.gzip_min_bytes,
            "conexiones"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8888,
            host: "127.0.0.1".to_string(),
            books_max: 20,
            books_reset_secs: 600,
            live_update_secs: 10,
            live_update_key: "sapiens".to_string(),
            read_timeout_ms: 5_000,
            write_timeout_ms: 10_000,
            max_body_bytes: 1_048_576,
            gzip_min_bytes: 1024,
            log_format: LogFormat::Text,
        }
    }
}
