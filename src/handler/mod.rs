//! Request handler module
//!
//! Router construction, dispatch, and the context handlers receive.

pub mod context;
pub mod router;
pub mod shared;

pub use context::{Context, ResponseWriter};
pub use router::{handler_fn, Handler, HandlerFuture, Router};
pub use shared::SharedRouter;
