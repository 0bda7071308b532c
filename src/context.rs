//! Per-request mutable state.
//!
//! A [`RequestContext`] is one HTTP transaction: the inbound request head and
//! body as received from the connection, plus the outbound response being
//! built. The server creates one per request, hands it to the composed
//! handler by `&mut`, and turns it into a wire response afterwards. It is
//! never shared between requests, so nothing in here is synchronised.

use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderValue};
use http::{Method, StatusCode, Uri};
use http_body_util::Full;

/// One in-flight request/response pair.
///
/// Header maps are [`http::HeaderMap`]s, so every lookup is
/// case-insensitive: `ctx.header("x-forwarded-for")` and
/// `ctx.header("X-Forwarded-For")` find the same entry.
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: SocketAddr,

    status: StatusCode,
    response_headers: HeaderMap,
    response_body: Bytes,
}

impl RequestContext {
    /// A bodiless request with no headers and a pending `200 OK` response.
    pub fn new(method: Method, uri: Uri, remote_addr: SocketAddr) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr,
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            response_body: Bytes::new(),
        }
    }

    /// Builds a context from a request head whose body has already been read.
    pub fn from_parts(parts: http::request::Parts, body: Bytes, remote_addr: SocketAddr) -> Self {
        let mut ctx = Self::new(parts.method, parts.uri, remote_addr);
        ctx.headers = parts.headers;
        ctx.body = body;
        ctx
    }

    // ── Inbound ──────────────────────────────────────────────────────────────

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn remote_addr(&self) -> SocketAddr { self.remote_addr }
    pub fn body(&self) -> &Bytes { &self.body }

    /// The request path, without the query string.
    pub fn path(&self) -> &str { self.uri.path() }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    /// Case-insensitive request header lookup.
    ///
    /// Returns `None` when the header is absent or its value is not visible
    /// ASCII. Use [`headers`](Self::headers) for raw bytes.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    // ── Outbound ─────────────────────────────────────────────────────────────

    pub fn status(&self) -> StatusCode { self.status }
    pub fn set_status(&mut self, status: StatusCode) { self.status = status; }

    pub fn response_headers(&self) -> &HeaderMap { &self.response_headers }
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap { &mut self.response_headers }

    /// Case-insensitive response header lookup.
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn response_body(&self) -> &Bytes { &self.response_body }

    pub fn set_response_body(&mut self, body: impl Into<Bytes>) {
        self.response_body = body.into();
    }

    /// Replaces the response with a plain-text error.
    ///
    /// Headers set earlier by other stages are kept; only the content type is
    /// overwritten.
    pub fn error(&mut self, message: impl Into<String>, status: StatusCode) {
        self.status = status;
        self.response_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.response_body = Bytes::from(message.into());
    }

    /// Consumes the context into the response handed back to hyper.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.response_body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.response_headers;
        response
    }
}
