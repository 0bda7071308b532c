//! End-to-end chain tests with the built-in middleware.
//!
//! Drives complete requests through `MiddlewareConfig::build_chain` and
//! hand-built chains, checking what the client would see: status, body and
//! headers after the whole pipeline has run.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use hermyx::middleware::{MARKER_HEADER, MARKER_VALUE};
use hermyx::{
    AuthMiddleware, Chain, LoggingMiddleware, Middleware, MiddlewareConfig, MiddlewareError,
    RequestContext, TransformMiddleware, fingerprint_str,
};
use http::header::HeaderValue;
use http::{Method, StatusCode};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn request(path: &str, headers: &[(&'static str, &'static str)]) -> RequestContext {
    let mut ctx = RequestContext::new(
        Method::GET,
        path.parse().unwrap(),
        "198.51.100.4:61000".parse().unwrap(),
    );
    for &(name, value) in headers {
        ctx.headers_mut().insert(name, HeaderValue::from_static(value));
    }
    ctx
}

/// Terminal stand-in: records that it ran and echoes what upstream would see.
fn upstream(calls: &Arc<AtomicUsize>) -> impl Fn(&mut RequestContext) + Send + Sync + use<> {
    let calls = Arc::clone(calls);
    move |ctx: &mut RequestContext| {
        calls.fetch_add(1, Ordering::SeqCst);
        let body = format!("{} via {}", ctx.path(), ctx.header("x-forwarded-for").unwrap_or("-"));
        ctx.set_status(StatusCode::OK);
        ctx.set_response_body(body);
    }
}

fn secured() -> MiddlewareConfig {
    MiddlewareConfig::from_yaml("auth:\n  header: X-Hermyx-Token\n  value: secret\n").unwrap()
}

#[test]
fn authorised_request_reaches_upstream_and_is_marked() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = secured().build_chain().unwrap().handle(upstream(&calls));

    let mut ctx = request("/api/items", &[("x-hermyx-token", "secret")]);
    handler.call(&mut ctx);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.status(), StatusCode::OK);
    assert_eq!(&ctx.response_body()[..], b"/api/items via 198.51.100.4:61000");
    assert_eq!(ctx.response_header("X-Hermyx-Middleware"), Some("transformed"));
}

#[test]
fn missing_token_is_forbidden_before_upstream() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = secured().build_chain().unwrap().handle(upstream(&calls));

    let mut ctx = request("/api/items", &[]);
    handler.call(&mut ctx);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctx.status(), StatusCode::FORBIDDEN);
    assert_eq!(&ctx.response_body()[..], b"missing auth");
    assert_eq!(ctx.response_header("content-type"), Some("text/plain; charset=utf-8"));
    assert!(ctx.response_headers().get(MARKER_HEADER).is_none());
    // auth rejected before transform's before-hook could run
    assert!(ctx.headers().get("x-forwarded-for").is_none());
}

#[test]
fn wrong_case_token_is_invalid() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = secured().build_chain().unwrap().handle(upstream(&calls));

    let mut ctx = request("/", &[("x-hermyx-token", "Secret")]);
    handler.call(&mut ctx);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctx.status(), StatusCode::FORBIDDEN);
    assert_eq!(&ctx.response_body()[..], b"invalid auth");
}

#[test]
fn unconfigured_auth_lets_everything_through() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = MiddlewareConfig::default().build_chain().unwrap().handle(upstream(&calls));

    for headers in [&[][..], &[("authorization", "whatever")][..]] {
        let mut ctx = request("/", headers);
        handler.call(&mut ctx);
        assert_eq!(ctx.status(), StatusCode::OK);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn existing_forwarded_for_reaches_upstream_unchanged() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = MiddlewareConfig::default().build_chain().unwrap().handle(upstream(&calls));

    let mut ctx = request("/", &[("x-forwarded-for", "1.2.3.4")]);
    handler.call(&mut ctx);

    assert_eq!(&ctx.response_body()[..], b"/ via 1.2.3.4");
}

#[test]
fn marker_is_set_even_when_upstream_errors() {
    let handler = Chain::builder()
        .with(TransformMiddleware::new())
        .build()
        .handle(|ctx: &mut RequestContext| ctx.set_status(StatusCode::BAD_GATEWAY));

    let mut ctx = request("/", &[]);
    handler.call(&mut ctx);

    assert_eq!(ctx.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(ctx.response_header("x-hermyx-middleware"), Some(MARKER_VALUE));
}

/// After-hook that always fails. Used to check failures stay advisory.
struct Flaky;

impl Middleware for Flaky {
    fn name(&self) -> &'static str { "flaky" }

    fn before_request(&self, _ctx: &mut RequestContext) -> Result<(), MiddlewareError> {
        Ok(())
    }

    fn after_response(&self, _ctx: &mut RequestContext) -> Result<(), MiddlewareError> {
        Err(MiddlewareError::advisory("could not annotate response"))
    }
}

#[test]
fn failing_after_hook_leaves_response_and_later_hooks_alone() {
    init_tracing();
    let handler = Chain::builder()
        .with(LoggingMiddleware::new())
        .with(Flaky)
        .with(TransformMiddleware::new())
        .build()
        .handle(|ctx: &mut RequestContext| {
            ctx.set_status(StatusCode::NOT_MODIFIED);
        });

    let mut ctx = request("/cached", &[]);
    handler.call(&mut ctx);

    assert_eq!(ctx.status(), StatusCode::NOT_MODIFIED);
    assert!(ctx.response_body().is_empty());
    assert_eq!(ctx.response_header("x-hermyx-middleware"), Some("transformed"));
}

#[test]
fn one_chain_serves_many_threads() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = Chain::builder()
        .with(AuthMiddleware::new("x-hermyx-token", "secret").unwrap())
        .with(TransformMiddleware::new())
        .build()
        .handle(upstream(&calls));

    thread::scope(|s| {
        for i in 0..8 {
            let handler = &handler;
            s.spawn(move || {
                for _ in 0..100 {
                    let token = if i % 2 == 0 { "secret" } else { "nope" };
                    let mut ctx = request("/", &[("x-hermyx-token", token)]);
                    handler.call(&mut ctx);

                    let expected = if i % 2 == 0 { StatusCode::OK } else { StatusCode::FORBIDDEN };
                    assert_eq!(ctx.status(), expected);
                }
            });
        }
    });

    assert_eq!(calls.load(Ordering::SeqCst), 400);
}

#[test]
fn fingerprint_makes_stable_cache_keys() {
    let ctx = request("/api/items?page=2", &[]);
    let key = format!("{} {}", ctx.method(), ctx.uri());

    let a = fingerprint_str(&key);
    let b = fingerprint_str(&key);
    assert_eq!(a, b);
    assert_eq!(a.as_str().len(), 64);
    assert_ne!(a, fingerprint_str("GET /api/items?page=3"));
}
