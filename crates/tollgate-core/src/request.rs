//! Requests as seen by the middleware chain

use crate::routing::RouteContext;
use crate::{Error, Result};
use bytes::Bytes;
use percent_encoding::percent_decode_str;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Header list; most requests fit inline
pub type Headers = SmallVec<[(String, String); 16]>;

/// Case-insensitive lookup of the first header called `name`
pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find_map(|(key, value)| key.eq_ignore_ascii_case(name).then_some(value.as_str()))
}

/// Request method
///
/// Each method contributes a lowercase prefix (`get_`, `post_`) to the
/// handler names the router looks up, see [`tollgate_router::method_prefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Connect,
    Trace,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Options,
        Method::Connect,
        Method::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
            Method::Trace => "TRACE",
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incoming request
///
/// `target` is kept exactly as received, query string included; the router
/// strips the mount point and query itself. `script_name` plays the role of
/// the CGI `SCRIPT_NAME` and tells the router where the application is
/// mounted. Middleware hands data downstream through `extensions`.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub target: String,
    pub script_name: String,
    pub headers: Headers,
    pub body: Bytes,
    pub extensions: http::Extensions,
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            script_name: String::new(),
            headers: Headers::new(),
            body: Bytes::new(),
            extensions: http::Extensions::new(),
        }
    }

    /// Target without query or fragment
    pub fn path(&self) -> &str {
        match self.target.find(['?', '#']) {
            Some(end) => &self.target[..end],
            None => &self.target,
        }
    }

    /// Query string without the leading `?`
    pub fn query(&self) -> Option<&str> {
        let (_, rest) = self.target.split_once('?')?;
        Some(rest.split_once('#').map_or(rest, |(query, _)| query))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Decoded query pairs; later keys overwrite earlier ones
    pub fn query_params(&self) -> HashMap<String, String> {
        self.query()
            .into_iter()
            .flat_map(|query| query.split('&'))
            .filter_map(|pair| pair.split_once('='))
            .map(|(key, value)| (form_decode(key), form_decode(value)))
            .collect()
    }

    /// Route attached by the [`Router`](crate::Router), once it has run
    pub fn route(&self) -> Option<&RouteContext> {
        self.extensions.get::<RouteContext>()
    }
}

/// Convenience builder, mostly for tests and embedding
#[derive(Debug)]
pub struct RequestBuilder(Request);

impl RequestBuilder {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self(Request::new(method, target))
    }

    pub fn script_name(mut self, script_name: impl Into<String>) -> Self {
        self.0.script_name = script_name.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.0.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        self.0
    }
}

fn form_decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
