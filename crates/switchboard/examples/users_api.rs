//! CRUD API example: in-memory user management.
//!
//! Routes, in declaration order:
//! - `GET /users/{id}` — fetch a user
//! - `POST /users` — create a user from the request body
//! - `PUT /users/{id}` — replace a user
//! - `DELETE /users/{id}` — delete a user
//!
//! All four handlers live on one controller, so the POST/PUT/DELETE
//! handlers are serialized against each other while GETs run freely.
//!
//! # Running This Example
//!
//! ```bash
//! cargo run --example users_api -p switchboard
//! ```
//!
//! # Equivalent curl Commands
//!
//! ```bash
//! curl -X POST http://127.0.0.1:8080/users -d '{"name": "Alice"}'
//! curl http://127.0.0.1:8080/users/1
//! curl -X PUT http://127.0.0.1:8080/users/1 -d '{"name": "Alice Smith"}'
//! curl -X DELETE http://127.0.0.1:8080/users/1
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use switchboard::prelude::*;

#[derive(Debug, Clone, Deserialize)]
struct UserInput {
    name: String,
}

#[derive(Debug, Clone, Serialize)]
struct User {
    id: i64,
    name: String,
}

#[derive(Default)]
struct UserDb {
    users: HashMap<i64, User>,
    next_id: i64,
}

fn main() {
    let report = RouteTableBuilder::new()
        .descriptor(
            RouteDescriptor::new(Method::Get, "/users/{id}", ("Users", "get"))
                .param("id", ParamType::Int),
        )
        .descriptor(RouteDescriptor::new(Method::Post, "/users", ("Users", "create")).with_body())
        .descriptor(
            RouteDescriptor::new(Method::Put, "/users/{id}", ("Users", "update"))
                .param("id", ParamType::Int)
                .with_body(),
        )
        .descriptor(
            RouteDescriptor::new(Method::Delete, "/users/{id}", ("Users", "delete"))
                .param("id", ParamType::Int),
        )
        .build();
    for error in &report.errors {
        eprintln!("route rejected: {error}");
    }

    let db = Arc::new(Mutex::new(UserDb::default()));

    let get_db = Arc::clone(&db);
    let create_db = Arc::clone(&db);
    let update_db = Arc::clone(&db);
    let delete_db = Arc::clone(&db);

    let registry = HandlerRegistry::new()
        .register("Users", "get", move |args: HandlerArgs<'_>| {
            let id = args.int(0).unwrap_or(0);
            let db = get_db.lock().expect("store lock");
            match db.users.get(&id) {
                Some(user) => Ok(Reply::ok(to_json(user)?)),
                None => Ok(Reply::new(404, format!("no user {id}"))),
            }
        })
        .register("Users", "create", move |args: HandlerArgs<'_>| {
            let input = parse_input(args.body().unwrap_or(""))?;
            let mut db = create_db.lock().expect("store lock");
            db.next_id += 1;
            let user = User {
                id: db.next_id,
                name: input.name,
            };
            let body = to_json(&user)?;
            db.users.insert(user.id, user);
            Ok(Reply::created(body))
        })
        .register("Users", "update", move |args: HandlerArgs<'_>| {
            let id = args.int(0).unwrap_or(0);
            let input = parse_input(args.body().unwrap_or(""))?;
            let mut db = update_db.lock().expect("store lock");
            match db.users.get_mut(&id) {
                Some(user) => {
                    user.name = input.name;
                    Ok(Reply::ok(to_json(user)?))
                }
                None => Ok(Reply::new(404, format!("no user {id}"))),
            }
        })
        .register("Users", "delete", move |args: HandlerArgs<'_>| {
            let id = args.int(0).unwrap_or(0);
            let mut db = delete_db.lock().expect("store lock");
            match db.users.remove(&id) {
                Some(_) => Ok(Reply::new(204, String::new())),
                None => Ok(Reply::new(404, format!("no user {id}"))),
            }
        });

    let server = Server::bind(
        ServerConfig::new().bind_addr("127.0.0.1:8080"),
        Dispatcher::new(report.table, registry),
        Logger::new(LogConfig::new().level(LogLevel::Debug)),
    )
    .expect("bind failed");

    server.serve().expect("server failed");
}

fn parse_input(body: &str) -> Result<UserInput, HandlerError> {
    serde_json::from_str(body).map_err(|err| HandlerError::failed(format!("bad input: {err}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, HandlerError> {
    serde_json::to_string(value).map_err(|err| HandlerError::failed(format!("encode: {err}")))
}
