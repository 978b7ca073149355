//! # Módulo HTTP
//!
//! Implementación mínima de HTTP/1.x hecha a mano:
//!
//! - Parsing de requests (métodos, headers, query, body binario)
//! - Construcción de responses (JSON, RFC 7807, gzip)
//! - Códigos de estado
//! - Fechas HTTP para `Last-Modified` y las precondiciones por fecha
//!
//! El servidor responde siempre con `Connection: close`, así que no hay
//! conexiones persistentes ni chunked transfer encoding.

pub mod date;
pub mod request;
pub mod response;
pub mod status;

pub use date::{format_http_date, parse_http_date};
pub use request::{Method, ParseError, Request};
pub(crate) use request::find_subslice;
pub use response::Response;
pub use status::StatusCode;
