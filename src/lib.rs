//! pathwise: a small HTTP request router
//!
//! Routes are `(method, pattern)` pairs such as `GET /users/:id`. Patterns are
//! stored in a segment tree; every request walks the tree once, collects named
//! parameters, and runs the matching handler or the router's fallback.
//!
//! ```no_run
//! use pathwise::{handler_fn, Context, HandlerError, Router};
//! use http_body_util::Full;
//! use hyper::body::Bytes;
//! use hyper::{Response, StatusCode};
//!
//! async fn show_user(mut ctx: Context) -> Result<Response<Full<Bytes>>, HandlerError> {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     ctx.json(&serde_json::json!({ "id": id }))?;
//!     Ok(ctx.into_response())
//! }
//!
//! async fn not_found(mut ctx: Context) -> Result<Response<Full<Bytes>>, HandlerError> {
//!     ctx.response_mut().set_status(StatusCode::NOT_FOUND);
//!     Ok(ctx.into_response())
//! }
//!
//! # fn main() -> Result<(), pathwise::RouterError> {
//! let mut router = Router::new(handler_fn(not_found));
//! router.get("/users/:id", handler_fn(show_user))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use error::{HandlerError, RouterError};
pub use handler::{handler_fn, Context, Handler, ResponseWriter, Router, SharedRouter};
pub use routing::{Method, Params};
