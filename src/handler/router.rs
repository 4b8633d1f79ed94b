//! Request routing dispatch module
//!
//! Owns the route tree and the fallback handler. Registration extends the
//! tree at startup; each request walks it once and runs exactly one handler.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Request, Response};

use super::context::Context;
use crate::error::{HandlerError, RouterError};
use crate::routing::{decode_segment, split_path, Method, Node, Params};

/// Default cap on collected request bodies (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: u64 = 1_048_576;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Future returned by a handler.
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<Response<Full<Bytes>>, HandlerError>> + Send>>;

/// A route handler (or the fallback).
pub type Handler = Arc<dyn Fn(Context) -> HandlerFuture + Send + Sync>;

/// Wrap an async function or closure as a `Handler`.
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response<Full<Bytes>>, HandlerError>> + Send + 'static,
{
    Arc::new(move |ctx: Context| -> HandlerFuture { Box::pin(f(ctx)) })
}

/// Method + path-pattern router with a single fallback handler.
pub struct Router {
    tree: Node<Handler>,
    fallback: Handler,
    max_body_size: u64,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes())
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Create an empty router. `fallback` serves every request that does not
    /// resolve to a method-specific handler.
    pub fn new(fallback: Handler) -> Self {
        Self {
            tree: Node::root(),
            fallback,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    #[must_use]
    pub fn with_max_body_size(mut self, limit: u64) -> Self {
        self.max_body_size = limit;
        self
    }

    /// Register `handler` for `method` on `pattern`.
    ///
    /// Fails when the method is not one of GET, POST, PUT, DELETE, PATCH or
    /// the pattern does not start with `/`. Either one is a mistake in the
    /// route table and should stop startup.
    pub fn register(
        &mut self,
        method: &str,
        pattern: &str,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        let method: Method = method.parse()?;
        self.tree.insert(method, pattern, handler)?;
        tracing::debug!(%method, pattern, "route registered");
        Ok(self)
    }

    pub fn get(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(Method::Get.as_str(), pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(Method::Post.as_str(), pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(Method::Put.as_str(), pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(Method::Delete.as_str(), pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(Method::Patch.as_str(), pattern, handler)
    }

    pub const fn tree(&self) -> &Node<Handler> {
        &self.tree
    }

    pub const fn max_body_size(&self) -> u64 {
        self.max_body_size
    }

    /// Registered `(method, pattern)` pairs.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.tree.routes()
    }

    /// Collect the request body (bounded by the configured limit) and dispatch.
    pub async fn handle<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, HandlerError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let limit = self.max_body_size;
        let limited = Limited::new(body, usize::try_from(limit).unwrap_or(usize::MAX));
        let bytes = match limited.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => {
                return Err(HandlerError::PayloadTooLarge { limit })
            }
            Err(e) => return Err(HandlerError::Body(e.to_string())),
        };
        self.dispatch(Request::from_parts(parts, bytes)).await
    }

    /// Route one request with a fully read body to exactly one handler.
    ///
    /// Form body values and query values seed the bindings, path captures are
    /// added while resolving. Path segments are percent-decoded before they
    /// are matched, like query and form values. A request that does not resolve completely, or
    /// whose node has nothing for its method, goes to the fallback.
    pub async fn dispatch(
        &self,
        req: Request<Bytes>,
    ) -> Result<Response<Full<Bytes>>, HandlerError> {
        let method = Method::try_from(req.method()).ok();
        let mut params = Params::new();

        if method.is_some_and(Method::carries_form) && is_form(req.headers()) {
            params.extend_urlencoded(req.body());
        }
        if let Some(query) = req.uri().query() {
            params.extend_urlencoded(query.as_bytes());
        }

        let handler = {
            let decoded: Vec<_> = split_path(req.uri().path())
                .into_iter()
                .map(decode_segment)
                .collect();
            let segments: Vec<&str> = decoded.iter().map(AsRef::as_ref).collect();
            let resolution = self.tree.resolve(&segments, Some(&mut params));
            match method.and_then(|m| resolution.handler(m)) {
                Some(handler) => Arc::clone(handler),
                None => {
                    tracing::debug!(
                        method = %req.method(),
                        path = req.uri().path(),
                        unmatched = ?resolution.unmatched,
                        "no route matched, using fallback"
                    );
                    Arc::clone(&self.fallback)
                }
            }
        };

        handler(Context::new(req, params)).await
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    fn named(name: &'static str) -> Handler {
        handler_fn(move |mut ctx: Context| async move {
            ctx.response_mut().write(name);
            Ok(ctx.into_response())
        })
    }

    fn fallback() -> Handler {
        handler_fn(|mut ctx: Context| async move {
            ctx.response_mut().set_status(StatusCode::NOT_FOUND);
            ctx.response_mut().write("fallback");
            Ok(ctx.into_response())
        })
    }

    async fn body_of(router: &Router, method: &str, uri: &str) -> String {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap();
        let response = router.dispatch(req).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_register_rejects_unknown_method() {
        let mut router = Router::new(fallback());
        let err = router.register("TRACE", "/users", named("x")).unwrap_err();
        assert_eq!(err, RouterError::UnsupportedMethod("TRACE".to_string()));
    }

    #[test]
    fn test_register_rejects_relative_pattern() {
        let mut router = Router::new(fallback());
        let err = router.get("users", named("x")).unwrap_err();
        assert_eq!(err, RouterError::InvalidPattern("users".to_string()));
        assert!(router.routes().is_empty());
    }

    #[test]
    fn test_shortcuts_chain() {
        let mut router = Router::new(fallback());
        router
            .get("/items", named("get"))
            .and_then(|r| r.post("/items", named("post")))
            .and_then(|r| r.put("/items/:id", named("put")))
            .and_then(|r| r.patch("/items/:id", named("patch")))
            .and_then(|r| r.delete("/items/:id", named("delete")))
            .unwrap();
        assert_eq!(router.routes().len(), 5);
        assert_eq!(router.tree().node_count(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_by_method() {
        let mut router = Router::new(fallback());
        router.get("/users", named("list")).unwrap();
        router.post("/users", named("create")).unwrap();

        assert_eq!(body_of(&router, "GET", "/users").await, "list");
        assert_eq!(body_of(&router, "POST", "/users").await, "create");
        assert_eq!(body_of(&router, "DELETE", "/users").await, "fallback");
    }

    #[tokio::test]
    async fn test_unsupported_request_method_uses_fallback() {
        let mut router = Router::new(fallback());
        router.get("/users", named("list")).unwrap();
        assert_eq!(body_of(&router, "HEAD", "/users").await, "fallback");
        assert_eq!(body_of(&router, "OPTIONS", "/users").await, "fallback");
    }

    #[tokio::test]
    async fn test_prefix_match_uses_fallback() {
        let mut router = Router::new(fallback());
        router.get("/users", named("list")).unwrap();
        assert_eq!(body_of(&router, "GET", "/users/42").await, "fallback");
    }

    #[tokio::test]
    async fn test_escaped_literal_segment_matches() {
        let mut router = Router::new(fallback());
        router.get("/hello world", named("hello")).unwrap();
        assert_eq!(body_of(&router, "GET", "/hello%20world").await, "hello");
        assert_eq!(body_of(&router, "GET", "/hello%FFworld").await, "fallback");
    }

    #[test]
    fn test_is_form() {
        let mut headers = HeaderMap::new();
        assert!(!is_form(&headers));
        headers.insert(
            CONTENT_TYPE,
            "application/x-www-form-urlencoded; charset=utf-8".parse().unwrap(),
        );
        assert!(is_form(&headers));
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        assert!(!is_form(&headers));
    }

    #[tokio::test]
    async fn test_handle_rejects_oversized_body() {
        let mut router = Router::new(fallback()).with_max_body_size(4);
        router.post("/upload", named("upload")).unwrap();
        let req = Request::builder()
            .method("POST")
            .uri("/upload")
            .body(Full::new(Bytes::from_static(b"too large")))
            .unwrap();
        let err = router.handle(req).await.unwrap_err();
        assert!(matches!(err, HandlerError::PayloadTooLarge { limit: 4 }));
    }

    #[tokio::test]
    async fn test_handle_collects_body() {
        let mut router = Router::new(fallback());
        router
            .post(
                "/echo",
                handler_fn(|mut ctx: Context| async move {
                    let body = ctx.request().body().clone();
                    ctx.response_mut().write(body);
                    Ok(ctx.into_response())
                }),
            )
            .unwrap();
        let req = Request::builder()
            .method("POST")
            .uri("/echo")
            .body(Full::new(Bytes::from_static(b"hello")))
            .unwrap();
        let response = router.handle(req).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"hello");
    }
}
