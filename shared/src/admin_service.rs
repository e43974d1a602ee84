//! Health and readiness probes, served on a dedicated listener.

use crate::http::{make_error_response, make_text_response};
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::{Ready, ready};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared readiness flag. Starts unready; flipped once the public listener is up.
#[derive(Clone, Debug, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct AdminService {
    readiness: Readiness,
}

impl AdminService {
    pub fn new(readiness: Readiness) -> Self {
        Self { readiness }
    }

    fn respond(&self, path: &str) -> Response<BoxBody<Bytes, Infallible>> {
        match path {
            "/health" => make_text_response("ok\n"),
            "/ready" if self.readiness.is_ready() => make_text_response("ok\n"),
            "/ready" => make_error_response(StatusCode::SERVICE_UNAVAILABLE),
            _ => make_error_response(StatusCode::NOT_FOUND),
        }
    }
}

impl<B> Service<Request<B>> for AdminService {
    type Response = Response<BoxBody<Bytes, Infallible>>;
    type Error = io::Error;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        ready(Ok(self.respond(req.uri().path())))
    }
}
