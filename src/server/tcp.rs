//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del servidor TCP que maneja múltiples conexiones simultáneas
//! usando threads. Cada conexión se procesa en su propio thread y atiende un
//! único request (`Connection: close`).
//!
//! ## Flujo por conexión
//!
//! ```text
//! accept → timeouts → leer headers → leer body (≤ max) → router
//!        → gzip → HEAD sin body → X-Request-Id → escribir → métricas
//! ```

use crate::books;
use crate::commands;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{find_subslice, Method, ParseError, Request};
use crate::metrics::{metrics_handler, MetricsCollector};
use crate::router::Router;
use crate::store::SharedStore;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};
use xxhash_rust::xxh3::xxh3_64;

/// Tope para request line + headers
const MAX_HEAD_BYTES: usize = 64 * 1024;

const READ_CHUNK: usize = 8192;

/// Estado compartido por todos los threads de conexión
struct ConnectionContext {
    router: Router,
    metrics: MetricsCollector,
    read_timeout: Duration,
    write_timeout: Duration,
    max_body_bytes: usize,
    gzip_min_bytes: usize,
    next_request: AtomicU64,
}

/// Lo que se pudo leer del socket
enum Incoming {
    /// El peer cerró sin mandar nada
    Closed,
    Request(Request),
    /// Request inválido o demasiado grande; se responde sin rutear
    Rejected(ApiError),
}

/// Servidor HTTP concurrente con métricas
pub struct Server {
    address: String,
    context: Arc<ConnectionContext>,
}

impl Server {
    /// Construye el router con todas las rutas de la API
    pub fn new(config: &Config, store: SharedStore) -> Self {
        let metrics = MetricsCollector::new();
        let router = build_router(&store, &metrics);

        Self {
            address: config.address(),
            context: Arc::new(ConnectionContext {
                router,
                metrics,
                read_timeout: config.read_timeout(),
                write_timeout: config.write_timeout(),
                max_body_bytes: config.max_body_bytes,
                gzip_min_bytes: config.gzip_min_bytes,
                next_request: AtomicU64::new(0),
            }),
        }
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.context.metrics
    }

    /// Hace bind en `host:port` y atiende conexiones indefinidamente
    pub fn run(&self) -> io::Result<()> {
        info!(address = %self.address, "iniciando servidor");
        let listener = TcpListener::bind(&self.address)?;
        self.serve(listener)
    }

    /// Atiende conexiones de un listener ya creado (útil con puerto 0)
    pub fn serve(&self, listener: TcpListener) -> io::Result<()> {
        let local = listener.local_addr()?;
        info!(address = %local, "servidor escuchando, un thread por conexión");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(e) => warn!(error = %e, "error al aceptar conexión"),
            }
        }

        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream) {
        let context = Arc::clone(&self.context);
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        debug!(peer = %peer, "nueva conexión");
        context.metrics.increment_active_connections();

        let spawned = thread::Builder::new().name("conn".to_string()).spawn({
            let context = Arc::clone(&context);
            move || {
                if let Err(e) = handle_connection(stream, &context) {
                    debug!(peer = %peer, error = %e, "conexión terminada con error");
                }
                context.metrics.decrement_active_connections();
            }
        });

        if let Err(e) = spawned {
            error!(error = %e, "no se pudo crear el thread de la conexión");
            context.metrics.decrement_active_connections();
        }
    }
}

/// Router con todas las rutas de la API
pub fn build_router(store: &SharedStore, metrics: &MetricsCollector) -> Router {
    let mut router = Router::new();

    commands::register_routes(&mut router);
    books::register_routes(&mut router, store);

    let (m, s) = (metrics.clone(), store.clone());
    router.get("/metrics", move |_req, _params| metrics_handler(&m, &s));

    router
}

fn handle_connection(mut stream: TcpStream, context: &ConnectionContext) -> io::Result<()> {
    let start = Instant::now();
    let request_id = next_request_id(context);

    stream.set_read_timeout(Some(context.read_timeout))?;
    stream.set_write_timeout(Some(context.write_timeout))?;

    let incoming = read_request(&mut stream, context.max_body_bytes)?;
    let (mut response, route, method, target) = match incoming {
        Incoming::Closed => {
            debug!("conexión cerrada sin datos");
            return Ok(());
        }
        Incoming::Rejected(err) => {
            warn!(request_id = %request_id, error = %err, "request rechazado");
            let mut response = err.into_response();
            Router::add_common_headers(&mut response);
            (response, "rejected".to_string(), None, String::new())
        }
        Incoming::Request(request) => {
            let route = context
                .router
                .matched_pattern(&request)
                .unwrap_or("unmatched")
                .to_string();
            let mut response = context.router.route(&request);

            let accept_encoding = request.header("Accept-Encoding");
            if let Err(e) = response.gzip_if_accepted(accept_encoding, context.gzip_min_bytes) {
                warn!(error = %e, "no se pudo comprimir la respuesta, se envía sin gzip");
            }
            if request.method() == Method::HEAD {
                response.strip_body();
            }
            (response, route, Some(request.method()), request.target())
        }
    };

    response.add_header("X-Request-Id", &request_id);

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    let latency = start.elapsed();
    let status = response.status();
    context.metrics.record_request(&route, status.as_u16(), latency);

    info!(
        request_id = %request_id,
        method = method.map(|m| m.as_str()).unwrap_or("-"),
        target = %target,
        status = status.as_u16(),
        latency_ms = latency.as_secs_f64() * 1000.0,
        "request atendido"
    );

    Ok(())
}

/// Lee headers y body respetando los límites
fn read_request(stream: &mut TcpStream, max_body_bytes: usize) -> io::Result<Incoming> {
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    // Headers
    let head_end = loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            if buffer.is_empty() {
                return Ok(Incoming::Closed);
            }
            // Sin terminador no se sabe qué headers faltan: nunca se rutea
            return Ok(reject(ParseError::IncompleteRequest));
        }
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(pos) = find_subslice(&buffer, b"\r\n\r\n") {
            break pos + 4;
        }
        if buffer.len() > MAX_HEAD_BYTES {
            return Ok(Incoming::Rejected(ApiError::BadRequest(format!(
                "request headers exceed {} bytes",
                MAX_HEAD_BYTES
            ))));
        }
    };

    let head = match Request::parse(&buffer[..head_end]) {
        Ok(head) => head,
        Err(e) => return Ok(reject(e)),
    };

    // Body
    let expected = head.content_length().unwrap_or(0);
    if expected > max_body_bytes {
        return Ok(Incoming::Rejected(ApiError::PayloadTooLarge { limit: max_body_bytes }));
    }

    let total = head_end + expected;
    while buffer.len() < total {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    if buffer.len() < total {
        return Ok(Incoming::Rejected(ApiError::BadRequest(format!(
            "body shorter than Content-Length ({} of {} bytes)",
            buffer.len() - head_end,
            expected
        ))));
    }

    Ok(match Request::parse(&buffer[..total]) {
        Ok(request) => Incoming::Request(request),
        Err(e) => reject(e),
    })
}

fn reject(error: ParseError) -> Incoming {
    Incoming::Rejected(ApiError::BadRequest(format!("invalid request: {}", error)))
}

/// 16 dígitos hex, únicos dentro del proceso
fn next_request_id(context: &ConnectionContext) -> String {
    let seq = context.next_request.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();

    let mut seed = [0u8; 16];
    seed[..8].copy_from_slice(&seq.to_be_bytes());
    seed[8..].copy_from_slice(&nanos.to_be_bytes());
    format!("{:016x}", xxh3_64(&seed))
}
