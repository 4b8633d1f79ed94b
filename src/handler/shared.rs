//! Publication point for a live router
//!
//! A `Router` is never mutated once requests are flowing. To change routes
//! while serving, build a complete replacement and publish it here; requests
//! already in flight keep the snapshot they loaded.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::router::Router;

/// Cheaply clonable handle to the router currently in service.
#[derive(Clone)]
pub struct SharedRouter {
    current: Arc<ArcSwap<Router>>,
}

impl SharedRouter {
    pub fn new(router: Router) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(router)),
        }
    }

    /// Snapshot of the router for one request.
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Swap in a fully built router for subsequent requests.
    pub fn replace(&self, router: Router) {
        let routes = router.routes().len();
        self.current.store(Arc::new(router));
        tracing::info!(routes, "router replaced");
    }
}

impl From<Router> for SharedRouter {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}
