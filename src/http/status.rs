//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado que usa el servicio. Los que aparecen en los handlers
//! tienen su propia variante; el resto (por ejemplo los que pide el cliente
//! en `/status/{code}` o en `?status=` del echo) se representan con
//! `StatusCode::Other`.
//!
//! - **2xx**: Éxito (200, 204)
//! - **3xx**: Redirección / caché (304)
//! - **4xx**: Error del cliente (400, 404, 405, 412, 413, 422)
//! - **5xx**: Error del servidor (500)

/// Representa un código de estado HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok,

    /// 204 No Content - Petición exitosa sin contenido en el body
    NoContent,

    /// 304 Not Modified - La copia en caché del cliente sigue vigente
    NotModified,

    /// 400 Bad Request - Parámetros inválidos o malformados
    BadRequest,

    /// 404 Not Found - Ruta o recurso no encontrado
    NotFound,

    /// 405 Method Not Allowed - La ruta existe pero no para este método
    MethodNotAllowed,

    /// 412 Precondition Failed - Falló If-Match / If-None-Match / ...
    PreconditionFailed,

    /// 413 Payload Too Large - El body excede el máximo configurado
    PayloadTooLarge,

    /// 422 Unprocessable Entity - Body bien formado pero inválido
    UnprocessableEntity,

    /// 500 Internal Server Error - Error interno del servidor
    InternalServerError,

    /// Cualquier otro código en el rango 100-599
    Other(u16),
}

impl StatusCode {
    /// Construye un código a partir de su valor numérico
    ///
    /// Retorna `None` si está fuera del rango 100-599.
    ///
    /// # Ejemplo
    /// ```
    /// use apibin::http::StatusCode;
    /// assert_eq!(StatusCode::from_u16(404), Some(StatusCode::NotFound));
    /// assert_eq!(StatusCode::from_u16(418), Some(StatusCode::Other(418)));
    /// assert_eq!(StatusCode::from_u16(99), None);
    /// ```
    pub fn from_u16(code: u16) -> Option<Self> {
        let status = match code {
            200 => StatusCode::Ok,
            204 => StatusCode::NoContent,
            304 => StatusCode::NotModified,
            400 => StatusCode::BadRequest,
            404 => StatusCode::NotFound,
            405 => StatusCode::MethodNotAllowed,
            412 => StatusCode::PreconditionFailed,
            413 => StatusCode::PayloadTooLarge,
            422 => StatusCode::UnprocessableEntity,
            500 => StatusCode::InternalServerError,
            100..=599 => StatusCode::Other(code),
            _ => return None,
        };
        Some(status)
    }

    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use apibin::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NoContent => 204,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::PreconditionFailed => 412,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::UnprocessableEntity => 422,
            StatusCode::InternalServerError => 500,
            StatusCode::Other(code) => *code,
        }
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use apibin::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::PreconditionFailed.reason_phrase(), "Precondition Failed");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.as_u16() {
            100 => "Continue",
            101 => "Switching Protocols",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            206 => "Partial Content",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            410 => "Gone",
            412 => "Precondition Failed",
            413 => "Payload Too Large",
            418 => "I'm a teapot",
            422 => "Unprocessable Entity",
            428 => "Precondition Required",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }

    /// Indica si la respuesta con este código no lleva body (1xx, 204, 304)
    pub fn forbids_body(&self) -> bool {
        let code = self.as_u16();
        (100..200).contains(&code) || code == 204 || code == 304
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
