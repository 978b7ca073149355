//! # Echo
//! src/commands/echo.rs
//!
//! Devuelve la información del request tal como llegó: método, headers,
//! URL, query y body. Sirve para depurar clientes y para probar peticiones
//! condicionales: la respuesta tiene un ETag derivado de su contenido y un
//! `Last-Modified` fijo.
//!
//! # Query parameters
//! - `status`: código HTTP a devolver (100-599, default 200)
//!
//! # Ejemplo de response
//! ```json
//! {
//!   "method": "POST",
//!   "headers": {"Content-Type": "application/json", "Host": "localhost:8888"},
//!   "host": "localhost:8888",
//!   "url": "http://localhost:8888/?status=201",
//!   "path": "/",
//!   "query": {"status": "201"},
//!   "body": "{\"hello\": \"world\"}",
//!   "parsed": {"hello": "world"}
//! }
//! ```

use crate::conditional::{quote_etag, Conditionals, Outcome, Safety};
use crate::error::{ApiError, ApiResult};
use crate::fingerprint::fingerprint;
use crate::http::{format_http_date, Request, Response, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Lo que el echo devuelve sobre el request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoModel {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub url: String,
    pub path: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    /// Body crudo: UTF-8 tal cual, o base64 si no es texto
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Body interpretado como JSON, si lo es
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Value>,
}

impl EchoModel {
    pub fn from_request(request: &Request) -> Self {
        let headers: BTreeMap<String, String> = request
            .headers()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let host = request.header("Host").map(str::to_string);
        let scheme = request.header("X-Forwarded-Proto").unwrap_or("http");
        let url = format!(
            "{}://{}{}",
            scheme,
            host.as_deref().unwrap_or_default(),
            request.target()
        );

        let query = request
            .query_params()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let raw = request.body();
        let body = if raw.is_empty() {
            None
        } else {
            Some(match std::str::from_utf8(raw) {
                Ok(text) => text.to_string(),
                Err(_) => STANDARD.encode(raw),
            })
        };
        let parsed = if raw.is_empty() {
            None
        } else {
            serde_json::from_slice(raw).ok()
        };

        Self {
            method: request.method().as_str().to_string(),
            headers,
            host,
            url,
            path: request.path().to_string(),
            query,
            body,
            parsed,
        }
    }
}

/// `Last-Modified` fijo del echo: 2022-02-01T12:34:56Z
pub fn echo_last_modified() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 2, 1, 12, 34, 56)
        .single()
        .unwrap_or_default()
}

/// Handler para `/` (GET, POST, PUT, PATCH, DELETE) y `PUT /types`
pub fn echo_handler(request: &Request) -> ApiResult<Response> {
    let status = match request.query_param("status") {
        None => StatusCode::Ok,
        Some(raw) => raw
            .parse::<u16>()
            .ok()
            .and_then(StatusCode::from_u16)
            .ok_or_else(|| {
                ApiError::Unprocessable(format!(
                    "status must be an integer between 100 and 599, got {:?}",
                    raw
                ))
            })?,
    };

    let model = EchoModel::from_request(request);
    let etag = fingerprint(&model)?;
    let last_modified = echo_last_modified();

    let outcome = Conditionals::from_request(request).check(
        "echo",
        &etag,
        last_modified,
        Safety::from_method(request.method()),
    )?;

    let response = match outcome {
        Outcome::NotModified => Response::new(StatusCode::NotModified),
        _ => Response::json_value(status, &model)?,
    };

    Ok(response
        .with_header("Cache-Control", "no-store")
        .with_header("Vary", "*")
        .with_header("ETag", &quote_etag(&etag))
        .with_header("Last-Modified", &format_http_date(last_modified)))
}
