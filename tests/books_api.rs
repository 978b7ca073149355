//! Tests de integración para el servidor HTTP
//! tests/books_api.rs
//!
//! Levantan el servidor completo en un puerto efímero (127.0.0.1:0) con el
//! dataset embebido y le hablan por TCP crudo, igual que un cliente real.

use apibin::config::Config;
use apibin::refresher::{reset_to_baseline, Baseline};
use apibin::server::Server;
use apibin::store::SharedStore;
use serde_json::Value;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

/// Response ya separada en partes
struct Reply {
    status: u16,
    head: String,
    body: String,
}

impl Reply {
    fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("body JSON inválido")
    }
}

/// Helper: servidor nuevo con el dataset base cargado
fn start_server() -> SocketAddr {
    let baseline = Baseline::embedded().expect("dataset embebido");
    let store = SharedStore::new(20);
    reset_to_baseline(&store, &baseline);

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    let server = Server::new(&Config::default(), store);

    thread::spawn(move || {
        let _ = server.serve(listener);
    });

    addr
}

/// Helper: envía un request HTTP y retorna la response completa
fn send(addr: SocketAddr, method: &str, path: &str, headers: &[(&str, &str)], body: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.set_write_timeout(Some(Duration::from_secs(5))).unwrap();

    let mut request = format!("{} {} HTTP/1.1\r\nHost: localhost\r\n", method, path);
    for (name, value) in headers {
        request.push_str(&format!("{}: {}\r\n", name, value));
    }
    if !body.is_empty() {
        request.push_str("Content-Type: application/json\r\n");
        request.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    request.push_str("\r\n");
    request.push_str(body);

    stream.write_all(request.as_bytes()).unwrap();
    stream.flush().unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw.as_str(), ""));
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);

    Reply {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

fn get(addr: SocketAddr, path: &str) -> Reply {
    send(addr, "GET", path, &[], "")
}

#[test]
fn test_list_books_sorted_baseline() {
    let addr = start_server();

    let reply = get(addr, "/books");
    assert_eq!(reply.status, 200, "response: {}", reply.head);

    let list = reply.json();
    let urls: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["url"].as_str().unwrap())
        .collect();

    assert_eq!(urls.len(), 10);
    assert_eq!(urls[0], "/books/a-brief-history-of-time");
    assert_eq!(urls[9], "/books/thinking-fast-and-slow");
    assert_eq!(list[0]["version"].as_str().unwrap().len(), 11);
}

#[test]
fn test_get_then_revalidate() {
    let addr = start_server();

    let first = get(addr, "/books/dune");
    assert_eq!(first.status, 200);
    assert_eq!(first.json()["title"], "Dune");

    let etag = first.header("ETag").expect("ETag");
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert!(first.header("Last-Modified").is_some());

    let second = send(addr, "GET", "/books/dune", &[("If-None-Match", &etag)], "");
    assert_eq!(second.status, 304);
    assert!(second.body.is_empty());
    assert_eq!(second.header("ETag"), Some(etag));
}

#[test]
fn test_put_then_get_and_stale_if_match() {
    let addr = start_server();
    let body = r#"{"title":"Children of Time","author":"Adrian Tchaikovsky"}"#;

    let created = send(addr, "PUT", "/books/children-of-time", &[], body);
    assert_eq!(created.status, 204);
    let etag = created.header("ETag").expect("ETag");

    let fetched = get(addr, "/books/children-of-time");
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.header("ETag"), Some(etag.clone()));
    assert_eq!(fetched.json()["author"], "Adrian Tchaikovsky");

    let stale = send(
        addr,
        "PUT",
        "/books/children-of-time",
        &[("If-Match", "\"AAAAAAAAAAA\"")],
        r#"{"title":"Otro"}"#,
    );
    assert_eq!(stale.status, 412);

    let fresh = send(
        addr,
        "PUT",
        "/books/children-of-time",
        &[("If-Match", &etag)],
        r#"{"title":"Otro"}"#,
    );
    assert_eq!(fresh.status, 204);

    // el libro nuevo queda al final de la lista
    let list = get(addr, "/books").json();
    let last = list.as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["url"], "/books/children-of-time");
}

#[test]
fn test_put_invalid_payloads() {
    let addr = start_server();

    assert_eq!(send(addr, "PUT", "/books/x", &[], "{not json").status, 400);
    assert_eq!(send(addr, "PUT", "/books/x", &[], r#"{"title":""}"#).status, 422);
    assert_eq!(get(addr, "/books/x").status, 404);
}

#[test]
fn test_delete_is_idempotent() {
    let addr = start_server();

    assert_eq!(send(addr, "DELETE", "/books/dune", &[], "").status, 204);
    assert_eq!(send(addr, "DELETE", "/books/dune", &[], "").status, 204);
    assert_eq!(get(addr, "/books/dune").status, 404);
}

#[test]
fn test_head_has_no_body() {
    let addr = start_server();

    let reply = send(addr, "HEAD", "/books/dune", &[], "");
    assert_eq!(reply.status, 200);
    assert!(reply.header("ETag").is_some());
    assert!(reply.body.is_empty());
}

#[test]
fn test_unknown_route_and_method() {
    let addr = start_server();

    let missing = get(addr, "/nope");
    assert_eq!(missing.status, 404);

    let not_allowed = send(addr, "POST", "/books", &[], "");
    assert_eq!(not_allowed.status, 405);
    let allow = not_allowed.header("Allow").expect("Allow");
    assert!(allow.contains("GET"));
}

#[test]
fn test_echo_reflects_request() {
    let addr = start_server();

    let reply = send(addr, "POST", "/?name=apibin", &[("X-Demo", "1")], r#"{"a":1}"#);
    assert_eq!(reply.status, 200);

    let echo = reply.json();
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["query"]["name"], "apibin");
    assert_eq!(echo["parsed"]["a"], 1);
    assert_eq!(reply.header("Cache-Control").as_deref(), Some("no-store"));
}

#[test]
fn test_metrics_after_requests() {
    let addr = start_server();

    get(addr, "/books");
    get(addr, "/books/dune");

    let reply = get(addr, "/metrics");
    assert_eq!(reply.status, 200);

    let metrics = reply.json();
    assert!(metrics["total_requests"].as_u64().unwrap() >= 2);
    assert_eq!(metrics["store"]["entries"], 10);
    assert_eq!(metrics["store"]["capacity"], 20);
}

#[test]
fn test_every_response_has_request_id() {
    let addr = start_server();

    let reply = get(addr, "/types");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.header("X-Request-Id").map(|id| id.len()), Some(16));
    assert!(reply.header("Server").unwrap().starts_with("apibin/"));
}
