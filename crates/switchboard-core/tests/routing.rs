//! End-to-end routing behavior: compilation, dispatch, and the
//! concurrency discipline, exercised through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use switchboard_core::{
    ConversionPolicy, DispatchError, Dispatcher, HandlerArgs, HandlerRegistry, Method, ParamType,
    Reply, Request, RouteDescriptor, RouteTableBuilder, RouterConfig, ValidationErrorKind,
};

fn build_dispatcher(descriptors: Vec<RouteDescriptor>, registry: HandlerRegistry) -> Dispatcher {
    let report = RouteTableBuilder::new().descriptors(descriptors).build();
    assert!(report.is_clean(), "unexpected errors: {:?}", report.errors);
    Dispatcher::new(report.table, registry)
}

#[test]
fn declaration_order_beats_specificity() {
    let registry = HandlerRegistry::new()
        .register("Users", "by_id", |args: HandlerArgs<'_>| {
            Ok(Reply::ok(format!("id:{}", args.text(0).unwrap_or(""))))
        })
        .register("Users", "me", |_| Ok(Reply::ok("me")));

    let dispatcher = build_dispatcher(
        vec![
            RouteDescriptor::new(Method::Get, "/users/{id}", ("Users", "by_id"))
                .param("id", ParamType::Str),
            RouteDescriptor::new(Method::Get, "/users/me", ("Users", "me")),
        ],
        registry,
    );

    // The placeholder route was declared first, so it wins even though the
    // literal route is more specific.
    let reply = dispatcher
        .dispatch(&Request::new(Method::Get, "/users/me"))
        .unwrap();
    assert_eq!(reply, Reply::ok("id:me"));
}

#[test]
fn unmatched_method_never_invokes_a_handler() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&invocations);
    let registry = HandlerRegistry::new().register("Users", "get", move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(Reply::ok("ok"))
    });

    let dispatcher = build_dispatcher(
        vec![
            RouteDescriptor::new(Method::Get, "/users/{id}", ("Users", "get"))
                .param("id", ParamType::Int),
        ],
        registry,
    );

    let err = dispatcher
        .dispatch(&Request::new(Method::Delete, "/users/42"))
        .unwrap_err();
    assert_eq!(err, DispatchError::NotFound);
    assert_eq!(invocations.load(Ordering::SeqCst), 0);
}

#[test]
fn body_arity_validation_reports_and_excludes() {
    let report = RouteTableBuilder::new()
        .descriptor(RouteDescriptor::new(Method::Post, "/a", ("C", "a")))
        .descriptor(
            RouteDescriptor::new(Method::Post, "/b", ("C", "b"))
                .with_body()
                .with_body(),
        )
        .descriptor(RouteDescriptor::new(Method::Get, "/c", ("C", "c")).with_body())
        .build();

    // The GET descriptor is never body-checked; only the two POSTs fail.
    assert_eq!(report.table.len(), 1);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[0].kind, ValidationErrorKind::MissingBody);
    assert_eq!(
        report.errors[1].kind,
        ValidationErrorKind::DuplicateBody { count: 2 }
    );
}

#[test]
fn rebuilding_from_the_same_descriptors_matches_identically() {
    let descriptors = || {
        vec![
            RouteDescriptor::new(Method::Get, "/users/{id}", ("Users", "get"))
                .param("id", ParamType::Int),
            RouteDescriptor::new(Method::Get, "/users/me", ("Users", "me")),
            RouteDescriptor::new(Method::Post, "/users", ("Users", "create")).with_body(),
        ]
    };
    let registry = || {
        HandlerRegistry::new()
            .register("Users", "get", |args: HandlerArgs<'_>| {
                Ok(Reply::ok(format!("get {}", args.int(0).unwrap_or(-1))))
            })
            .register("Users", "me", |_| Ok(Reply::ok("me")))
            .register("Users", "create", |_| Ok(Reply::created("made")))
    };

    let first = build_dispatcher(descriptors(), registry());
    let second = build_dispatcher(descriptors(), registry());

    let probes = [
        Request::new(Method::Get, "/users/7"),
        Request::new(Method::Get, "/users/me"),
        Request::new(Method::Post, "/users").with_body("x"),
        Request::new(Method::Delete, "/users/7"),
        Request::new(Method::Get, "/users/7/posts"),
    ];
    for request in &probes {
        assert_eq!(first.dispatch(request), second.dispatch(request));
    }
}

#[test]
fn concurrent_posts_to_one_controller_are_serialized() {
    let in_section = Arc::new(AtomicUsize::new(0));
    let max_overlap = Arc::new(AtomicUsize::new(0));

    let (section, overlap) = (Arc::clone(&in_section), Arc::clone(&max_overlap));
    let registry = HandlerRegistry::new().register("Orders", "create", move |_| {
        let now = section.fetch_add(1, Ordering::SeqCst) + 1;
        overlap.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        section.fetch_sub(1, Ordering::SeqCst);
        Ok(Reply::created("ok"))
    });

    let dispatcher = Arc::new(build_dispatcher(
        vec![RouteDescriptor::new(Method::Post, "/orders", ("Orders", "create")).with_body()],
        registry,
    ));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                dispatcher
                    .dispatch(&Request::new(Method::Post, "/orders").with_body("{}"))
                    .unwrap()
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    // The critical section never held more than one mutating request.
    assert_eq!(max_overlap.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_gets_on_one_controller_overlap() {
    let inside = Arc::new(AtomicUsize::new(0));

    let count = Arc::clone(&inside);
    let registry = HandlerRegistry::new().register("Orders", "list", move |_| {
        count.fetch_add(1, Ordering::SeqCst);
        // Wait until the other GET is also inside its handler body. With
        // per-controller serialization of GETs this would time out.
        let start = Instant::now();
        let overlapped = loop {
            if count.load(Ordering::SeqCst) >= 2 {
                break true;
            }
            if start.elapsed() > Duration::from_secs(2) {
                break false;
            }
            thread::sleep(Duration::from_millis(1));
        };
        Ok(Reply::ok(if overlapped { "overlap" } else { "alone" }))
    });

    let dispatcher = Arc::new(build_dispatcher(
        vec![RouteDescriptor::new(Method::Get, "/orders", ("Orders", "list"))],
        registry,
    ));

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                dispatcher
                    .dispatch(&Request::new(Method::Get, "/orders"))
                    .unwrap()
            })
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap(), Reply::ok("overlap"));
    }
}

#[test]
fn a_get_runs_concurrently_with_a_mutating_request() {
    let registry = HandlerRegistry::new()
        .register("Orders", "create", |_| {
            thread::sleep(Duration::from_millis(300));
            Ok(Reply::created("slow"))
        })
        .register("Orders", "list", |_| Ok(Reply::ok("fast")));

    let dispatcher = Arc::new(build_dispatcher(
        vec![
            RouteDescriptor::new(Method::Post, "/orders", ("Orders", "create")).with_body(),
            RouteDescriptor::new(Method::Get, "/orders", ("Orders", "list")),
        ],
        registry,
    ));

    let post_dispatcher = Arc::clone(&dispatcher);
    let post = thread::spawn(move || {
        post_dispatcher
            .dispatch(&Request::new(Method::Post, "/orders").with_body("{}"))
            .unwrap()
    });

    // Give the POST a head start so its handler holds the lock.
    thread::sleep(Duration::from_millis(50));

    let start = Instant::now();
    let reply = dispatcher
        .dispatch(&Request::new(Method::Get, "/orders"))
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(reply, Reply::ok("fast"));
    // The GET did not wait for the 300ms mutating handler to release.
    assert!(elapsed < Duration::from_millis(200), "GET waited {elapsed:?}");
    post.join().unwrap();
}

#[test]
fn conversion_policies_are_both_observable_end_to_end() {
    let descriptors = || {
        vec![
            RouteDescriptor::new(Method::Get, "/items/{id}", ("Items", "get"))
                .param("id", ParamType::Int),
        ]
    };
    let registry = || {
        HandlerRegistry::new().register("Items", "get", |args: HandlerArgs<'_>| {
            Ok(Reply::ok(format!("{}", args.int(0).unwrap_or(-1))))
        })
    };

    let strict = build_dispatcher(descriptors(), registry());
    let err = strict
        .dispatch(&Request::new(Method::Get, "/items/abc"))
        .unwrap_err();
    assert!(matches!(err, DispatchError::BadParameter(_)));

    let report = RouteTableBuilder::new().descriptors(descriptors()).build();
    let legacy = Dispatcher::with_config(
        report.table,
        registry(),
        RouterConfig::new().conversion_policy(ConversionPolicy::ZeroOnError),
    );
    let reply = legacy
        .dispatch(&Request::new(Method::Get, "/items/abc"))
        .unwrap();
    assert_eq!(reply, Reply::ok("0"));
}
