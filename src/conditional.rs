//! # Peticiones Condicionales
//! src/conditional.rs
//!
//! Evalúa `If-Match`, `If-None-Match`, `If-Modified-Since` e
//! `If-Unmodified-Since` contra el fingerprint y la fecha de modificación
//! actuales de un recurso (RFC 7232 §6).
//!
//! ## Orden de evaluación
//!
//! 1. `If-Match` (o, si falta, `If-Unmodified-Since`) protege escrituras
//!    contra lecturas viejas → 412.
//! 2. `If-None-Match` (o, si falta, `If-Modified-Since`) revalida cachés
//!    → 304 en lecturas, 412 en escrituras.
//!
//! La evaluación es pura: no hace I/O ni toca el store.

use crate::error::ApiError;
use crate::http::{parse_http_date, Method, Request};
use chrono::{DateTime, Utc};

/// Resultado de evaluar las precondiciones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Proceed,
    NotModified,
    PreconditionFailed,
}

/// Si el request lee (GET/HEAD) o modifica el recurso
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Read,
    Write,
}

impl Safety {
    pub fn from_method(method: Method) -> Self {
        if method.is_safe() {
            Safety::Read
        } else {
            Safety::Write
        }
    }
}

/// Headers condicionales de un request, ya parseados
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditionals {
    pub if_match: Vec<String>,
    pub if_none_match: Vec<String>,
    pub if_modified_since: Option<DateTime<Utc>>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
}

impl Conditionals {
    /// Extrae las condiciones de los headers del request
    ///
    /// Las fechas inválidas se ignoran, como si el header no viniera.
    pub fn from_request(request: &Request) -> Self {
        Self {
            if_match: request.header("If-Match").map(parse_etag_list).unwrap_or_default(),
            if_none_match: request
                .header("If-None-Match")
                .map(parse_etag_list)
                .unwrap_or_default(),
            if_modified_since: request.header("If-Modified-Since").and_then(parse_http_date),
            if_unmodified_since: request.header("If-Unmodified-Since").and_then(parse_http_date),
        }
    }

    /// `true` si el request no trae ninguna condición
    pub fn is_empty(&self) -> bool {
        self.if_match.is_empty()
            && self.if_none_match.is_empty()
            && self.if_modified_since.is_none()
            && self.if_unmodified_since.is_none()
    }

    /// Decide si el request puede continuar
    ///
    /// Las fechas se comparan a resolución de segundos, que es lo que puede
    /// expresar una fecha HTTP.
    ///
    /// # Ejemplo
    /// ```
    /// use apibin::conditional::{Conditionals, Outcome, Safety};
    /// use chrono::Utc;
    ///
    /// let cond = Conditionals {
    ///     if_none_match: vec!["abc".to_string()],
    ///     ..Default::default()
    /// };
    /// assert_eq!(cond.evaluate("abc", Utc::now(), Safety::Read), Outcome::NotModified);
    /// assert_eq!(cond.evaluate("abc", Utc::now(), Safety::Write), Outcome::PreconditionFailed);
    /// assert_eq!(cond.evaluate("xyz", Utc::now(), Safety::Read), Outcome::Proceed);
    /// ```
    pub fn evaluate(&self, etag: &str, modified: DateTime<Utc>, safety: Safety) -> Outcome {
        let modified_secs = modified.timestamp();

        if !self.if_match.is_empty() {
            if !matches_any(&self.if_match, etag) {
                return Outcome::PreconditionFailed;
            }
        } else if let Some(since) = self.if_unmodified_since {
            if modified_secs > since.timestamp() {
                return Outcome::PreconditionFailed;
            }
        }

        let unchanged = if !self.if_none_match.is_empty() {
            matches_any(&self.if_none_match, etag)
        } else if let Some(since) = self.if_modified_since {
            modified_secs <= since.timestamp()
        } else {
            false
        };

        match (unchanged, safety) {
            (false, _) => Outcome::Proceed,
            (true, Safety::Read) => Outcome::NotModified,
            (true, Safety::Write) => Outcome::PreconditionFailed,
        }
    }

    /// Igual que `evaluate` pero convierte el 412 en `ApiError`
    ///
    /// Retorna `Ok(Outcome::Proceed)` u `Ok(Outcome::NotModified)`; el
    /// segundo solo es posible en lecturas.
    pub fn check(
        &self,
        resource: &str,
        etag: &str,
        modified: DateTime<Utc>,
        safety: Safety,
    ) -> Result<Outcome, ApiError> {
        match self.evaluate(etag, modified, safety) {
            Outcome::PreconditionFailed => Err(ApiError::PreconditionFailed(format!(
                "precondition failed for {}, found resource with ETag \"{}\"",
                resource, etag
            ))),
            outcome => Ok(outcome),
        }
    }
}

fn matches_any(tags: &[String], etag: &str) -> bool {
    tags.iter().any(|tag| tag == "*" || tag == etag)
}

/// `"a", W/"b", *` → ["a", "b", "*"]
///
/// El prefijo débil se descarta: nuestros ETags son fuertes y una comparación
/// débil contra ellos equivale a la fuerte.
pub fn parse_etag_list(header: &str) -> Vec<String> {
    header
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(|tag| {
            let tag = tag.strip_prefix("W/").unwrap_or(tag);
            tag.trim_matches('"').to_string()
        })
        .collect()
}

/// Formatea un fingerprint como valor del header `ETag`
pub fn quote_etag(fingerprint: &str) -> String {
    format!("\"{}\"", fingerprint)
}
