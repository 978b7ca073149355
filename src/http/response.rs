//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas de forma programática y convertirlas a
//! bytes para enviar al cliente.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 13\r\n
//! ETag: "AbCdEfGhIjk"\r\n
//! \r\n
//! {"ok": true}
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use apibin::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{"message": "Hello"}"#);
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::StatusCode;
use crate::error::ApiError;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Headers HTTP. Usamos HashMap para evitar duplicados
    headers: HashMap<String, String>,

    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (sobrescribe si ya existe con cualquier capitalización)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Versión mutable de `with_header`
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el body desde un string y calcula `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el body desde bytes y calcula `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        let len = self.body.len().to_string();
        self.add_header("Content-Length", &len);
        self
    }

    /// Crea una respuesta JSON exitosa (200 OK) desde un string ya serializado
    ///
    /// # Ejemplo
    /// ```
    /// use apibin::http::Response;
    ///
    /// let response = Response::json(r#"{"status": "ok"}"#);
    /// assert_eq!(response.header("content-type"), Some("application/json"));
    /// ```
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Serializa `value` como JSON con el código indicado
    pub fn json_value<T: Serialize + ?Sized>(
        status: StatusCode,
        value: &T,
    ) -> Result<Self, ApiError> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body_bytes(body))
    }

    /// Crea una respuesta de error en formato RFC 7807
    ///
    /// ```
    /// use apibin::http::{Response, StatusCode};
    ///
    /// let response = Response::problem(StatusCode::NotFound, "dune not found");
    /// let body = String::from_utf8(response.body().to_vec()).unwrap();
    /// assert!(body.contains("\"status\":404"));
    /// ```
    pub fn problem(status: StatusCode, detail: &str) -> Self {
        let doc = serde_json::json!({
            "title": status.reason_phrase(),
            "status": status.as_u16(),
            "detail": detail,
        });
        Self::new(status)
            .with_header("Content-Type", "application/problem+json")
            .with_body(&doc.to_string())
    }

    /// Quita el body conservando los headers (respuestas a HEAD)
    pub fn strip_body(&mut self) {
        self.body.clear();
    }

    /// Comprime el body con gzip si el cliente lo acepta y vale la pena
    ///
    /// Retorna `true` si la respuesta quedó comprimida.
    pub fn gzip_if_accepted(
        &mut self,
        accept_encoding: Option<&str>,
        min_bytes: usize,
    ) -> std::io::Result<bool> {
        let accepts_gzip = accept_encoding.map(accepts_gzip).unwrap_or(false);
        if !accepts_gzip
            || self.body.len() < min_bytes
            || self.body.is_empty()
            || self.header("Content-Encoding").is_some()
        {
            return Ok(false);
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.body)?;
        let compressed = encoder.finish()?;

        self.body = compressed;
        let len = self.body.len().to_string();
        self.add_header("Content-Length", &len);
        self.add_header("Content-Encoding", "gzip");
        Ok(true)
    }

    /// Convierte la respuesta a bytes listos para el socket
    ///
    /// Los códigos sin body (1xx, 204, 304) nunca lo escriben; 1xx y 204
    /// tampoco llevan `Content-Length` (RFC 9110 §8.6).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(256 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        let code = self.status.as_u16();
        let omit_length = code < 200 || code == 204;
        for (name, value) in &self.headers {
            if omit_length && name.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        if !self.status.forbids_body() && self.header("Content-Length").is_none() {
            result.extend_from_slice(b"Content-Length: 0\r\n");
        }

        result.extend_from_slice(b"\r\n");

        if !self.status.forbids_body() {
            result.extend_from_slice(&self.body);
        }

        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header sin distinguir mayúsculas/minúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// `Accept-Encoding: gzip, br;q=0.5` → true; `gzip;q=0` → false
fn accepts_gzip(header: &str) -> bool {
    header.split(',').any(|item| {
        let mut parts = item.split(';').map(str::trim);
        let coding = parts.next().unwrap_or("");
        if !coding.eq_ignore_ascii_case("gzip") && coding != "*" {
            return false;
        }
        !parts.any(|p| {
            p.strip_prefix("q=")
                .and_then(|q| q.parse::<f32>().ok())
                .map(|q| q == 0.0)
                .unwrap_or(false)
        })
    })
}
