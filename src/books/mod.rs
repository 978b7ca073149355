//! # Colección Books
//!
//! Recursos mutables con control de concurrencia optimista (ETag +
//! Last-Modified) sobre el `SharedStore`.

pub mod handlers;
pub mod types;

pub use handlers::register_routes;
pub use types::{Book, BookError, BookSummary, Rating};
