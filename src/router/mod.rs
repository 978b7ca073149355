//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea método + path a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → ApiResult<Response> → Response
//! ```
//!
//! Los patrones admiten segmentos `{param}` (por ejemplo `/books/{id}`).
//! Reglas de despacho:
//!
//! - `HEAD` usa la ruta `GET` si no hay una `HEAD` explícita
//! - path conocido con método incorrecto → 405 con header `Allow`
//! - path desconocido → 404
//!
//! Los errores de los handlers se renderizan como RFC 7807.

use crate::error::{ApiError, ApiResult};
use crate::http::{Method, Request, Response};
use std::collections::HashMap;
use std::sync::Arc;

/// Tipo de función handler
///
/// Un closure para que los handlers puedan capturar estado compartido
/// (store, métricas) sin variables globales.
pub type Handler = Arc<dyn Fn(&Request, &PathParams) -> ApiResult<Response> + Send + Sync>;

/// Valor del header `Server`
pub const SERVER_NAME: &str = concat!("apibin/", env!("CARGO_PKG_VERSION"));

/// Segmentos `{param}` capturados del path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    /// Como `get` pero un parámetro ausente es un 400
    pub fn require(&self, name: &str) -> ApiResult<&str> {
        self.get(name)
            .ok_or_else(|| ApiError::BadRequest(format!("missing path parameter {}", name)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Patrón compilado: `/books/{id}` → [Literal("books"), Param("id")]
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    fn parse(raw: &str) -> Self {
        let segments = split_path(raw)
            .map(|seg| match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(seg.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => {
                    let value = urlencoding::decode(part)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| part.to_string());
                    params.values.insert(name.clone(), value);
                }
            }
        }
        Some(params)
    }
}

/// `/` → [], `/books/` → ["books"], `/a//b` → ["a", "", "b"]
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.trim_start_matches('/');
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}

struct Route {
    method: Method,
    pattern: Pattern,
    handler: Handler,
}

/// Router que mapea método + patrón a handlers
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use apibin::http::{Method, Request, Response};
    /// use apibin::router::Router;
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/hello/{name}", |_req, params| {
    ///     let name = params.require("name")?;
    ///     Ok(Response::json(&format!(r#"{{"hello": "{}"}}"#, name)))
    /// });
    ///
    /// let request = Request::parse(b"GET /hello/world HTTP/1.1\r\n\r\n").unwrap();
    /// let response = router.route(&request);
    /// assert_eq!(response.body(), br#"{"hello": "world"}"#);
    /// ```
    pub fn register<F>(&mut self, method: Method, pattern: &str, handler: F)
    where
        F: Fn(&Request, &PathParams) -> ApiResult<Response> + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: Pattern::parse(pattern),
            handler: Arc::new(handler),
        });
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&Request, &PathParams) -> ApiResult<Response> + Send + Sync + 'static,
    {
        self.register(Method::GET, pattern, handler);
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&Request, &PathParams) -> ApiResult<Response> + Send + Sync + 'static,
    {
        self.register(Method::PUT, pattern, handler);
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F)
    where
        F: Fn(&Request, &PathParams) -> ApiResult<Response> + Send + Sync + 'static,
    {
        self.register(Method::DELETE, pattern, handler);
    }

    /// Registra el mismo handler para varios métodos
    pub fn register_many<F>(&mut self, methods: &[Method], pattern: &str, handler: F)
    where
        F: Fn(&Request, &PathParams) -> ApiResult<Response> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        for method in methods {
            self.routes.push(Route {
                method: *method,
                pattern: Pattern::parse(pattern),
                handler: Arc::clone(&handler),
            });
        }
    }

    /// Número de rutas registradas
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Patrón de la ruta que atendería `request`, para agrupar métricas
    pub fn matched_pattern(&self, request: &Request) -> Option<&str> {
        self.routes
            .iter()
            .find(|route| route.pattern.matches(request.path()).is_some())
            .map(|route| route.pattern.raw.as_str())
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Siempre retorna una respuesta: los errores del handler y los 404/405
    /// se convierten en documentos de error.
    pub fn route(&self, request: &Request) -> Response {
        let mut response = match self.dispatch(request) {
            Ok(response) => response,
            Err(err) => err.into_response(),
        };
        Self::add_common_headers(&mut response);
        response
    }

    fn dispatch(&self, request: &Request) -> ApiResult<Response> {
        let method = request.method();
        let path = request.path();

        let mut allowed: Vec<Method> = Vec::new();
        let mut head_fallback = None;

        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            if route.method == method {
                return (route.handler)(request, &params);
            }
            if method == Method::HEAD && route.method == Method::GET && head_fallback.is_none() {
                head_fallback = Some((Arc::clone(&route.handler), params));
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method);
            }
        }

        if let Some((handler, params)) = head_fallback {
            return handler(request, &params);
        }
        if allowed.is_empty() {
            return Err(ApiError::NotFound(format!("route {}", path)));
        }
        if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
            allowed.push(Method::HEAD);
        }
        Err(ApiError::method_not_allowed(method, &allowed))
    }

    /// Agrega headers comunes a todas las respuestas
    pub fn add_common_headers(response: &mut Response) {
        response.add_header("Server", SERVER_NAME);
        response.add_header("Connection", "close");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    fn ok_handler(_req: &Request, _params: &PathParams) -> ApiResult<Response> {
        Ok(Response::json(r#"{"test": "ok"}"#))
    }

    fn echo_id(_req: &Request, params: &PathParams) -> ApiResult<Response> {
        let id = params.require("id")?;
        Ok(Response::json(&format!(r#"{{"id": "{}"}}"#, id)))
    }

    fn parse(raw: &[u8]) -> Request {
        Request::parse(raw).unwrap()
    }

    #[test]
    fn test_router_creation() {
        let router = Router::new();
        assert!(router.is_empty());
    }

    #[test]
    fn test_register_route() {
        let mut router = Router::new();
        router.get("/test", ok_handler);
        router.register_many(&[Method::POST, Method::PUT], "/", ok_handler);

        assert_eq!(router.len(), 3);
    }

    #[test]
    fn test_route_found() {
        let mut router = Router::new();
        router.get("/test", ok_handler);

        let response = router.route(&parse(b"GET /test HTTP/1.0\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Connection"), Some("close"));
        assert!(response.header("Server").unwrap().starts_with("apibin/"));
    }

    #[test]
    fn test_route_not_found() {
        let router = Router::new();
        let response = router.route(&parse(b"GET /nonexistent HTTP/1.0\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.header("Content-Type"), Some("application/problem+json"));
    }

    #[test]
    fn test_path_params() {
        let mut router = Router::new();
        router.get("/books/{id}", echo_id);

        let response = router.route(&parse(b"GET /books/dune HTTP/1.1\r\n\r\n"));
        assert_eq!(response.body(), br#"{"id": "dune"}"#);

        let response = router.route(&parse(b"GET /books/the%20hobbit HTTP/1.1\r\n\r\n"));
        assert_eq!(response.body(), br#"{"id": "the hobbit"}"#);
    }

    #[test]
    fn test_segment_count_must_match() {
        let mut router = Router::new();
        router.get("/books/{id}", echo_id);

        let status = |raw: &[u8]| router.route(&parse(raw)).status();
        assert_eq!(status(b"GET /books HTTP/1.1\r\n\r\n"), StatusCode::NotFound);
        assert_eq!(status(b"GET /books/a/b HTTP/1.1\r\n\r\n"), StatusCode::NotFound);
        assert_eq!(status(b"GET /books/ HTTP/1.1\r\n\r\n"), StatusCode::NotFound);
    }

    #[test]
    fn test_root_pattern() {
        let mut router = Router::new();
        router.get("/", ok_handler);

        assert_eq!(router.route(&parse(b"GET / HTTP/1.1\r\n\r\n")).status(), StatusCode::Ok);
        assert_eq!(
            router.route(&parse(b"GET /other HTTP/1.1\r\n\r\n")).status(),
            StatusCode::NotFound
        );
    }

    #[test]
    fn test_method_not_allowed() {
        let mut router = Router::new();
        router.get("/books/{id}", echo_id);
        router.put("/books/{id}", echo_id);

        let response = router.route(&parse(b"POST /books/dune HTTP/1.1\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
        assert_eq!(response.header("Allow"), Some("GET, PUT, HEAD"));
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let mut router = Router::new();
        router.get("/test", ok_handler);

        let response = router.route(&parse(b"HEAD /test HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::Ok);
    }

    #[test]
    fn test_handler_error_rendered() {
        let mut router = Router::new();
        router.delete("/fail", |_req, _params| Err(ApiError::PreconditionFailed("nope".into())));

        let response = router.route(&parse(b"DELETE /fail HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::PreconditionFailed);
        assert_eq!(response.header("Connection"), Some("close"));
    }

    #[test]
    fn test_matched_pattern() {
        let mut router = Router::new();
        router.get("/books/{id}", echo_id);

        assert_eq!(
            router.matched_pattern(&parse(b"GET /books/dune HTTP/1.1\r\n\r\n")),
            Some("/books/{id}")
        );
        assert_eq!(router.matched_pattern(&parse(b"GET /x HTTP/1.1\r\n\r\n")), None);
    }
}
