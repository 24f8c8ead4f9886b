//! Responses produced by handlers and the dispatcher

use crate::request::{find_header, Headers};
use crate::Error;
use bytes::Bytes;

pub use http::StatusCode;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Response returned through the middleware chain
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Empty 200
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn text(body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::OK)
            .header("content-type", TEXT_PLAIN)
            .body(body)
            .build()
    }

    pub fn html(body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::OK)
            .header("content-type", "text/html; charset=utf-8")
            .body(body)
            .build()
    }

    pub fn json(body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::OK)
            .header("content-type", "application/json")
            .body(body)
            .build()
    }

    /// 302 to `location`, usually a path from [`RouteContext::link`](crate::RouteContext::link)
    pub fn found(location: &str) -> Self {
        ResponseBuilder::new(StatusCode::FOUND)
            .header("location", location)
            .build()
    }

    /// Status with its canonical reason as a plain-text body
    pub fn error(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        ResponseBuilder::new(status)
            .header("content-type", TEXT_PLAIN)
            .body(reason)
            .build()
    }

    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND)
    }

    pub fn internal_error() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body as UTF-8, `None` for binary bodies
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.to_vec()).ok()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

impl From<&Error> for Response {
    fn from(err: &Error) -> Self {
        Response::error(err.status())
    }
}

/// Chainable construction of a [`Response`]
#[derive(Debug)]
pub struct ResponseBuilder(Response);

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self(Response::new(status))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.0.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        self.0
    }
}
