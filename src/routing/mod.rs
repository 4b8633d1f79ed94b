//! Routing module
//!
//! Provides the path-matching core:
//! - Segment tree built by route registration
//! - Request-time resolution with named parameter capture
//! - Multi-valued parameter bindings

pub mod method;
pub mod params;
pub mod tree;

pub use method::Method;
pub use params::Params;
pub use tree::{decode_segment, split_path, Node, Resolution};
