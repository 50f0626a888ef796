//! End-to-end transport tests over a real socket.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;

use switchboard_core::{
    Dispatcher, HandlerArgs, HandlerError, HandlerRegistry, LogConfig, LogLevel, Logger, Method,
    ParamType, Reply, RouteDescriptor, RouteTableBuilder,
};
use switchboard_http::{Server, ServerConfig};

fn demo_dispatcher() -> Dispatcher {
    let report = RouteTableBuilder::new()
        .descriptor(
            RouteDescriptor::new(Method::Get, "/users/{id}", ("Users", "get"))
                .param("id", ParamType::Int),
        )
        .descriptor(RouteDescriptor::new(Method::Post, "/users", ("Users", "create")).with_body())
        .descriptor(RouteDescriptor::new(Method::Get, "/boom", ("Users", "boom")))
        .build();
    assert!(report.is_clean());

    let registry = HandlerRegistry::new()
        .register("Users", "get", |args: HandlerArgs<'_>| {
            Ok(Reply::ok(format!("user {}", args.int(0).unwrap_or(-1))))
        })
        .register("Users", "create", |args: HandlerArgs<'_>| {
            Ok(Reply::created(format!(
                "stored {} bytes",
                args.body().map_or(0, str::len)
            )))
        })
        .register("Users", "boom", |_| Err(HandlerError::failed("kaboom")));

    Dispatcher::new(report.table, registry)
}

fn spawn_server() -> std::net::SocketAddr {
    let server = Server::bind(
        ServerConfig::new().bind_addr("127.0.0.1:0"),
        demo_dispatcher(),
        Logger::new(LogConfig::new().level(LogLevel::Error)),
    )
    .expect("bind");
    let addr = server.local_addr().expect("local addr");
    thread::spawn(move || server.serve());
    addr
}

fn roundtrip(addr: std::net::SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.write_all(raw).expect("write");
    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read");
    response
}

fn body_of(response: &str) -> &str {
    response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or("")
}

#[test]
fn a_matched_get_comes_back_enveloped() {
    let addr = spawn_server();
    let response = roundtrip(addr, b"GET /users/42 HTTP/1.1\r\nHost: x\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: application/json"));
    assert_eq!(body_of(&response), r#"{"serverCode":200,"response":"user 42"}"#);
}

#[test]
fn a_post_carries_its_body_to_the_handler() {
    let addr = spawn_server();
    let response = roundtrip(
        addr,
        b"POST /users HTTP/1.1\r\nContent-Length: 9\r\n\r\n{\"x\": 1}!",
    );

    assert!(response.starts_with("HTTP/1.1 201 Created\r\n"));
    assert_eq!(
        body_of(&response),
        r#"{"serverCode":201,"response":"stored 9 bytes"}"#
    );
}

#[test]
fn an_unmatched_route_is_the_legacy_404_envelope() {
    let addr = spawn_server();
    let response = roundtrip(addr, b"DELETE /users/42 HTTP/1.1\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(
        body_of(&response),
        r#"{"serverCode":404,"response":"Invalid request"}"#
    );
}

#[test]
fn a_bad_int_parameter_is_a_400() {
    let addr = spawn_server();
    let response = roundtrip(addr, b"GET /users/not-a-number HTTP/1.1\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(body_of(&response).contains("cannot convert 'not-a-number' to int"));
}

#[test]
fn a_handler_failure_is_a_500_without_internal_detail() {
    let addr = spawn_server();
    let response = roundtrip(addr, b"GET /boom HTTP/1.1\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(!response.contains("kaboom"));
}

#[test]
fn garbage_gets_a_400_and_the_loop_keeps_serving() {
    let addr = spawn_server();

    let garbage = roundtrip(addr, b"NOT AN HTTP REQUEST\r\n\r\n");
    assert!(garbage.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    // The accept loop survived; a well-formed request still works.
    let next = roundtrip(addr, b"GET /users/7 HTTP/1.1\r\n\r\n");
    assert!(next.starts_with("HTTP/1.1 200 OK\r\n"));
}

#[test]
fn the_query_string_is_invisible_to_routing() {
    let addr = spawn_server();
    let response = roundtrip(addr, b"GET /users/42?fields=name HTTP/1.1\r\n\r\n");
    assert_eq!(body_of(&response), r#"{"serverCode":200,"response":"user 42"}"#);
}
