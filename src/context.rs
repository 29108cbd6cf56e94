//! Request context shared between the transport and the engine.
//!
//! The transport builds a [`RequestContext`] from the raw request (method,
//! target, headers, body bytes) and hands it to
//! [`Dispatcher::dispatch`](crate::dispatcher::Dispatcher::dispatch). The
//! engine and the handlers write the response (status, headers, body) back
//! into the same context, which the transport then serializes.

use std::sync::Arc;

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;

use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::meta::EndpointDescriptor;
use crate::router::ParamVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage; names keep their original casing.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response body written by a handler or the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Reply {
    /// Leave whatever the handler already wrote into the context untouched.
    #[default]
    Empty,
    Text(String),
    Json(Value),
    Bytes(Vec<u8>),
}

impl Reply {
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Reply::Text(body.into())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Reply::Empty => None,
            Reply::Text(_) => Some("text/plain; charset=utf-8"),
            Reply::Json(_) => Some("application/json"),
            Reply::Bytes(_) => Some("application/octet-stream"),
        }
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Reply::Empty
    }
}

impl From<String> for Reply {
    fn from(body: String) -> Self {
        Reply::Text(body)
    }
}

impl From<&str> for Reply {
    fn from(body: &str) -> Self {
        Reply::Text(body.to_string())
    }
}

impl From<Value> for Reply {
    fn from(body: Value) -> Self {
        Reply::Json(body)
    }
}

impl From<Vec<u8>> for Reply {
    fn from(body: Vec<u8>) -> Self {
        Reply::Bytes(body)
    }
}

/// The endpoint a request resolved to, visible to matched-phase interceptors.
#[derive(Debug, Clone)]
pub struct MatchedEndpoint {
    descriptor: Arc<EndpointDescriptor>,
    version: String,
}

impl MatchedEndpoint {
    pub(crate) fn new(descriptor: Arc<EndpointDescriptor>, version: String) -> Self {
        Self {
            descriptor,
            version,
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.descriptor.method
    }

    #[must_use]
    pub fn path_template(&self) -> &str {
        &self.descriptor.path_template
    }

    /// The version alias that selected this endpoint (`"default"` on fallback).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn descriptor(&self) -> &EndpointDescriptor {
        &self.descriptor
    }
}

/// Per-request state: the incoming request plus the response being built.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    query: ParamVec,
    headers: HeaderVec,
    body: Vec<u8>,
    path_params: ParamVec,
    matched: Option<MatchedEndpoint>,
    status: u16,
    response_headers: HeaderVec,
    reply: Reply,
}

impl RequestContext {
    /// Create a context from a method and request target (`/path?query`).
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, ParamVec::new()),
        };
        Self {
            request_id: RequestId::new(),
            method,
            path: path.to_string(),
            query,
            headers: HeaderVec::new(),
            body: Vec::new(),
            path_params: ParamVec::new(),
            matched: None,
            status: 200,
            response_headers: HeaderVec::new(),
            reply: Reply::Empty,
        }
    }

    /// Add a request header. A valid `x-request-id` is adopted as the request id.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case(REQUEST_ID_HEADER) {
            self.request_id = RequestId::from_header_or_new(Some(&value));
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get a request header by name (case-insensitive per RFC 7230)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Get a query parameter by name; the last occurrence wins.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie from the `Cookie` header.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Get a path parameter of the matched route; the last occurrence wins.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn path_params(&self) -> &ParamVec {
        &self.path_params
    }

    /// The resolved endpoint; `None` before matching and for unmatched requests.
    #[must_use]
    pub fn matched(&self) -> Option<&MatchedEndpoint> {
        self.matched.as_ref()
    }

    pub(crate) fn set_matched(&mut self, matched: MatchedEndpoint, path_params: ParamVec) {
        self.matched = Some(matched);
        self.path_params = path_params;
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Add or replace a response header (case-insensitive).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.response_headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.response_headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn response_headers(&self) -> &HeaderVec {
        &self.response_headers
    }

    pub fn result(&mut self, body: impl Into<String>) -> &mut Self {
        self.reply(Reply::Text(body.into()))
    }

    pub fn json(&mut self, body: Value) -> &mut Self {
        self.reply(Reply::Json(body))
    }

    /// Write a reply. [`Reply::Empty`] leaves the current body in place.
    pub fn reply(&mut self, reply: Reply) -> &mut Self {
        if let Some(content_type) = reply.content_type() {
            self.set_header("content-type", content_type);
            self.reply = reply;
        }
        self
    }

    #[must_use]
    pub fn response_body(&self) -> &Reply {
        &self.reply
    }
}

fn parse_query(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn target_is_split_into_path_and_query() {
        let ctx = RequestContext::new(Method::GET, "/users?limit=10&name=red%20panda&limit=20");
        assert_eq!(ctx.path(), "/users");
        assert_eq!(ctx.query("limit"), Some("20"));
        assert_eq!(ctx.query("name"), Some("red panda"));
        assert_eq!(ctx.query("offset"), None);
    }

    #[test]
    fn headers_and_cookies_are_case_insensitive_by_name() {
        let ctx = RequestContext::new(Method::GET, "/")
            .with_header("Authorization", "Bearer token")
            .with_header("Cookie", "session=abc; theme = dark");
        assert_eq!(ctx.header("authorization"), Some("Bearer token"));
        assert_eq!(ctx.cookie("session"), Some("abc"));
        assert_eq!(ctx.cookie("theme"), Some("dark"));
        assert_eq!(ctx.cookie("missing"), None);
    }

    #[test]
    fn request_id_header_is_adopted() {
        let id = RequestId::new();
        let ctx = RequestContext::new(Method::GET, "/").with_header("X-Request-Id", id.to_string());
        assert_eq!(ctx.request_id(), id);
    }

    #[test]
    fn empty_reply_keeps_existing_body() {
        let mut ctx = RequestContext::new(Method::GET, "/");
        ctx.json(json!({"ok": true}));
        ctx.reply(Reply::Empty);
        assert_eq!(ctx.response_body(), &Reply::Json(json!({"ok": true})));
        assert_eq!(ctx.response_header("Content-Type"), Some("application/json"));
    }
}
