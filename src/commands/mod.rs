//! # Comandos del Servidor
//!
//! Endpoints sin estado que el servidor expone junto a la colección books.
//!
//! ## Categorías de comandos
//!
//! - **echo**: devuelve la información del request (`/`, `PUT /types`)
//! - **samples**: respuestas de ejemplo (`/types`, `/cached/{seconds}`,
//!   `/status/{code}`)
//!
//! Cada comando es una función handler que recibe un Request y retorna un
//! `ApiResult<Response>`.

pub mod echo;
pub mod samples;

pub use echo::{echo_handler, EchoModel};
pub use samples::{cached_handler, status_handler, types_handler};

use crate::http::Method;
use crate::router::Router;

/// Métodos que acepta el echo en `/`
pub const ECHO_METHODS: [Method; 5] =
    [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

/// Registra los comandos en el router
pub fn register_routes(router: &mut Router) {
    router.register_many(&ECHO_METHODS, "/", |req, _params| echo_handler(req));

    router.get("/types", types_handler);
    router.put("/types", |req, _params| echo_handler(req));

    router.get("/cached/{seconds}", cached_handler);
    router.get("/status/{code}", status_handler);
}
