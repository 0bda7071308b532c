//! Minimal hermyx pipeline: config → chain → stand-in upstream → server.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example proxy
//!
//! Try:
//!   curl -i http://localhost:8080/api/items
//!   curl -i -H 'x-hermyx-token: s3cr3t' http://localhost:8080/api/items
//!   curl -i -H 'x-hermyx-token: s3cr3t' -H 'x-forwarded-for: 1.2.3.4' http://localhost:8080/

use hermyx::{MiddlewareConfig, RequestContext, Server, fingerprint_str};

const CONFIG: &str = "\
auth:
  header: X-Hermyx-Token
  value: s3cr3t
logging: true
transform: true
";

#[tokio::main]
async fn main() -> Result<(), hermyx::Error> {
    tracing_subscriber::fmt::init();

    let chain = MiddlewareConfig::from_yaml(CONFIG)?.build_chain()?;
    tracing::info!(middlewares = ?chain.names(), "chain built");

    Server::bind("0.0.0.0:8080")?
        .serve(chain.handle(upstream))
        .await
}

// Stands in for the proxy/cache engine: reports the cache key it would use
// and the forwarding chain it would send upstream.
fn upstream(ctx: &mut RequestContext) {
    let key = fingerprint_str(&format!("{} {}", ctx.method(), ctx.uri()));
    let forwarded = ctx.header("x-forwarded-for").unwrap_or("-").to_owned();

    ctx.response_headers_mut().insert(
        "content-type",
        http::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    ctx.set_response_body(format!("cache-key={key}\nforwarded-for={forwarded}\n"));
}
