//! Minimal example: one GET route.
//!
//! # Running This Example
//!
//! ```bash
//! cargo run --example hello_world -p switchboard
//! ```
//!
//! Then:
//!
//! ```bash
//! curl http://127.0.0.1:8080/hello/world
//! # {"serverCode":200,"response":"Hello, world!"}
//! ```

use switchboard::prelude::*;

fn main() {
    let report = RouteTableBuilder::new()
        .descriptor(
            RouteDescriptor::new(Method::Get, "/hello/{name}", ("Greeter", "hello"))
                .param("name", ParamType::Str),
        )
        .build();

    let registry = HandlerRegistry::new().register("Greeter", "hello", |args: HandlerArgs<'_>| {
        Ok(Reply::ok(format!("Hello, {}!", args.text(0).unwrap_or("stranger"))))
    });

    let server = Server::bind(
        ServerConfig::new().bind_addr("127.0.0.1:8080"),
        Dispatcher::new(report.table, registry),
        Logger::new(LogConfig::new().level(LogLevel::Debug)),
    )
    .expect("bind failed");

    server.serve().expect("server failed");
}
