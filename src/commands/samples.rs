//! # Respuestas de Ejemplo
//! src/commands/samples.rs
//!
//! Endpoints estáticos para probar clientes:
//! - `GET /types`: documento con un valor de cada tipo JSON común
//! - `GET /cached/{seconds}`: respuesta cacheable N segundos
//! - `GET /status/{code}`: respuesta vacía con el código pedido

use crate::error::{ApiError, ApiResult};
use crate::http::{Request, Response, StatusCode};
use crate::router::PathParams;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};

const MAX_CACHE_SECONDS: u32 = 300;

#[derive(Debug, Clone, Serialize)]
pub struct TypesModel {
    pub nullable: Option<()>,
    pub boolean: bool,
    pub integer: i64,
    pub number: f64,
    pub string: String,
    pub tags: Vec<String>,
    pub object: SubObject,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubObject {
    #[serde(serialize_with = "as_base64")]
    pub binary: Vec<u8>,
    #[serde(serialize_with = "as_base64")]
    pub binary_long: Vec<u8>,
    pub date: DateTime<Utc>,
    pub date_time: DateTime<Utc>,
    pub url: String,
}

fn as_base64<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

impl TypesModel {
    /// Ejemplo fijo salvo por las fechas, que son "hoy" y "ahora"
    pub fn example(now: DateTime<Utc>) -> Self {
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or(now);

        Self {
            nullable: None,
            boolean: true,
            integer: 42,
            number: 123.45,
            string: "Hello, world!".to_string(),
            tags: vec!["example".to_string(), "short".to_string()],
            object: SubObject {
                binary: vec![222, 173, 192, 222],
                binary_long: (0..16).collect(),
                date: midnight,
                date_time: now,
                url: "https://rest.sh/".to_string(),
            },
        }
    }
}

/// Handler para `GET /types`
pub fn types_handler(_req: &Request, _params: &PathParams) -> ApiResult<Response> {
    Response::json_value(StatusCode::Ok, &TypesModel::example(Utc::now()))
}

#[derive(Debug, Clone, Serialize)]
pub struct CachedModel {
    pub generated: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

/// Handler para `GET /cached/{seconds}?private=true`
///
/// # Ejemplo de response
/// ```json
/// {
///   "generated": "2024-05-01T12:00:00Z",
///   "until": "2024-05-01T12:00:30Z"
/// }
/// ```
pub fn cached_handler(req: &Request, params: &PathParams) -> ApiResult<Response> {
    let raw = params.require("seconds")?;
    let seconds: u32 = raw
        .parse()
        .ok()
        .filter(|s| (1..=MAX_CACHE_SECONDS).contains(s))
        .ok_or_else(|| {
            ApiError::Unprocessable(format!(
                "seconds must be an integer between 1 and {}, got {:?}",
                MAX_CACHE_SECONDS, raw
            ))
        })?;

    let private = match req.query_param("private") {
        None | Some("") => false,
        Some(value) => value
            .parse::<bool>()
            .map_err(|_| {
                ApiError::Unprocessable(format!("private must be true or false, got {:?}", value))
            })?,
    };

    let mut cache_control = format!("max-age={}", seconds);
    if private {
        cache_control = format!("private, {}", cache_control);
    }

    let generated = Utc::now();
    let model = CachedModel {
        generated,
        until: generated + Duration::seconds(i64::from(seconds)),
    };

    Ok(Response::json_value(StatusCode::Ok, &model)?.with_header("Cache-Control", &cache_control))
}

/// Handler para `GET /status/{code}?retry-after=..&x-retry-in=..`
pub fn status_handler(req: &Request, params: &PathParams) -> ApiResult<Response> {
    let raw = params.require("code")?;
    let status = raw
        .parse::<u16>()
        .ok()
        .and_then(StatusCode::from_u16)
        .ok_or_else(|| {
            ApiError::Unprocessable(format!(
                "code must be an integer between 100 and 599, got {:?}",
                raw
            ))
        })?;

    let mut response = Response::new(status);
    if let Some(value) = req.query_param("retry-after").filter(|v| !v.is_empty()) {
        response.add_header("Retry-After", value);
    }
    if let Some(value) = req.query_param("x-retry-in").filter(|v| !v.is_empty()) {
        response.add_header("X-Retry-In", value);
    }
    Ok(response)
}
