//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (un thread por conexión)
//! 3. Lee y parsea requests HTTP con límites de tamaño y tiempo
//! 4. Genera y envía responses HTTP

pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::{build_router, Server};
