//! Request context handed to handlers
//!
//! A `Context` owns the inbound request (with its body already collected), a
//! response sink the handler writes into, and the parameter bindings of this
//! request.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, Request, Response, StatusCode};
use serde::Serialize;

use crate::error::HandlerError;
use crate::routing::Params;

/// Outbound response under construction.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

impl ResponseWriter {
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Set a header from string parts, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), HandlerError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(hyper::http::Error::from)?;
        let value = HeaderValue::from_str(value).map_err(hyper::http::Error::from)?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Append bytes to the body.
    pub fn write(&mut self, data: impl AsRef<[u8]>) {
        self.body.extend_from_slice(data.as_ref());
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Everything a handler gets for one request.
#[derive(Debug)]
pub struct Context {
    request: Request<Bytes>,
    response: ResponseWriter,
    params: Params,
}

impl Context {
    pub fn new(request: Request<Bytes>, params: Params) -> Self {
        Self {
            request,
            response: ResponseWriter::default(),
            params,
        }
    }

    pub const fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn method(&self) -> &hyper::Method {
        self.request.method()
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// First value bound to `name` by the path, query string or form body.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub const fn response(&self) -> &ResponseWriter {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut ResponseWriter {
        &mut self.response
    }

    /// Encode `data` as JSON onto the response body.
    ///
    /// Sets `Content-Type: application/json` and appends the document followed
    /// by a newline. Nothing is written when encoding fails.
    pub fn json<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<(), HandlerError> {
        let mut encoded = serde_json::to_vec(data)?;
        encoded.push(b'\n');
        self.response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.response.write(encoded);
        Ok(())
    }

    /// Finish the request, turning the sink into a hyper response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        self.response.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn context() -> Context {
        let request = Request::builder()
            .uri("/users/42")
            .body(Bytes::new())
            .unwrap();
        let mut params = Params::new();
        params.add("id", "42");
        Context::new(request, params)
    }

    #[test]
    fn test_json_sets_content_type() {
        let mut ctx = context();
        ctx.json(&serde_json::json!({ "id": 42 })).unwrap();
        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_json_appends_newline() {
        let mut ctx = context();
        ctx.json(&vec![1, 2]).unwrap();
        assert_eq!(ctx.response().body(), b"[1,2]\n");
    }

    #[test]
    fn test_json_encoding_error_surfaces() {
        let mut ctx = context();
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], "value");
        let err = ctx.json(&bad).unwrap_err();
        assert!(matches!(err, HandlerError::Json(_)));
        assert!(ctx.response().body().is_empty());
        assert!(ctx.response().headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_set_header_rejects_invalid_value() {
        let mut ctx = context();
        let err = ctx.response_mut().set_header("X-Test", "bad\nvalue").unwrap_err();
        assert!(matches!(err, HandlerError::Http(_)));
        ctx.response_mut().set_header("X-Test", "ok").unwrap();
        assert_eq!(ctx.response().headers().get("x-test").unwrap(), "ok");
    }

    #[test]
    fn test_param_lookup() {
        let ctx = context();
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.path(), "/users/42");
        assert_eq!(*ctx.method(), hyper::Method::GET);
    }
}
