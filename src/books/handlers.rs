//! # Handlers de Books
//! src/books/handlers.rs
//!
//! CRUD sobre la colección versionada:
//!
//! | Método | Path | Éxito | Condicionales |
//! |---|---|---|---|
//! | GET | `/books` | 200 + resúmenes ordenados | - |
//! | GET/HEAD | `/books/{id}` | 200 + libro | 304 / 412 |
//! | PUT | `/books/{id}` | 204 (upsert) | 412 |
//! | DELETE | `/books/{id}` | 204 (idempotente) | 412 |
//!
//! En escrituras las precondiciones solo se evalúan si ya existe una entrada:
//! crear un libro nunca falla por condiciones. `If-None-Match: *` contra un
//! libro existente sí produce 412.

use super::types::{Book, BookSummary};
use crate::conditional::{quote_etag, Conditionals, Outcome, Safety};
use crate::error::{ApiError, ApiResult};
use crate::fingerprint::fingerprint;
use crate::http::{format_http_date, Request, Response, StatusCode};
use crate::router::Router;
use crate::store::SharedStore;
use chrono::Utc;
use serde_json::error::Category;
use tracing::{debug, info};

const CACHE_CONTROL: &str = "max-age=0";
const VARY: &str = "Accept, Accept-Encoding, Origin";

/// Registra las rutas de la colección en el router
pub fn register_routes(router: &mut Router, store: &SharedStore) {
    let s = store.clone();
    router.get("/books", move |_req, _params| list_books(&s));

    let s = store.clone();
    router.get("/books/{id}", move |req, params| get_book(&s, req, params.require("id")?));

    let s = store.clone();
    router.put("/books/{id}", move |req, params| put_book(&s, req, params.require("id")?));

    let s = store.clone();
    router.delete("/books/{id}", move |req, params| delete_book(&s, req, params.require("id")?));
}

/// `GET /books`
pub fn list_books(store: &SharedStore) -> ApiResult<Response> {
    let entries = store.read().list()?;

    let summaries: Vec<BookSummary> = entries
        .into_iter()
        .map(|entry| BookSummary {
            url: format!("/books/{}", urlencoding::encode(&entry.key)),
            version: entry.fingerprint,
            modified: entry.modified_at,
        })
        .collect();

    Response::json_value(StatusCode::Ok, &summaries)
}

/// `GET|HEAD /books/{id}`
pub fn get_book(store: &SharedStore, request: &Request, id: &str) -> ApiResult<Response> {
    let conditionals = Conditionals::from_request(request);

    let entry = store
        .read()
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

    let etag = entry.fingerprint()?;
    let safety = Safety::from_method(request.method());
    let outcome = conditionals.check(id, &etag, entry.modified_at, safety)?;

    let response = match outcome {
        Outcome::NotModified => {
            debug!(id, "libro no modificado");
            Response::new(StatusCode::NotModified)
        }
        _ => Response::json_value(StatusCode::Ok, &entry.payload)?
            .with_header("Cache-Control", CACHE_CONTROL)
            .with_header("Vary", VARY),
    };

    Ok(response
        .with_header("ETag", &quote_etag(&etag))
        .with_header("Last-Modified", &format_http_date(entry.modified_at)))
}

/// `PUT /books/{id}`
pub fn put_book(store: &SharedStore, request: &Request, id: &str) -> ApiResult<Response> {
    let book = parse_book(request.body())?;
    let payload = serde_json::to_value(&book)?;
    let etag = fingerprint(&payload)?;
    let conditionals = Conditionals::from_request(request);
    let now = Utc::now();

    let evicted = {
        let mut guard = store.write();
        if !conditionals.is_empty() {
            if let Some(existing) = guard.get(id) {
                let current = existing.fingerprint()?;
                conditionals.check(id, &current, existing.modified_at, Safety::Write)?;
            }
        }
        guard.put_at(id, payload, now)
    };

    info!(id, etag = %etag, "libro guardado");
    if !evicted.is_empty() {
        info!(evicted = ?evicted, "libros desalojados por capacidad");
    }

    Ok(Response::new(StatusCode::NoContent)
        .with_header("ETag", &quote_etag(&etag))
        .with_header("Last-Modified", &format_http_date(now)))
}

/// `DELETE /books/{id}`
pub fn delete_book(store: &SharedStore, request: &Request, id: &str) -> ApiResult<Response> {
    let conditionals = Conditionals::from_request(request);

    let removed = {
        let mut guard = store.write();
        if !conditionals.is_empty() {
            if let Some(existing) = guard.get(id) {
                let current = existing.fingerprint()?;
                conditionals.check(id, &current, existing.modified_at, Safety::Write)?;
            }
        }
        guard.delete(id).is_some()
    };

    if removed {
        info!(id, "libro eliminado");
    }
    Ok(Response::new(StatusCode::NoContent))
}

/// JSON mal formado → 400; JSON válido que no es un libro aceptable → 422
fn parse_book(body: &[u8]) -> ApiResult<Book> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("request body is required".to_string()));
    }

    let book: Book = serde_json::from_slice(body).map_err(|err| match err.classify() {
        Category::Data => ApiError::Unprocessable(format!("invalid book: {}", err)),
        _ => ApiError::BadRequest(format!("malformed JSON body: {}", err)),
    })?;

    book.validate()
        .map_err(|err| ApiError::Unprocessable(format!("invalid book: {}", err)))?;
    Ok(book)
}
