//! HTTP protocol layer module
//!
//! Response builders used by the transport when a request never reaches a
//! handler's own response.

pub mod response;

pub use response::{build_error_response, build_not_found_response};
