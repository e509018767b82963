//! A route-table `Router`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::{Handler, Router};

/// Maps route names to handlers. Built once, then shared read-only.
#[derive(Default, Clone)]
pub struct ActionRouter {
    routes: HashMap<String, Arc<dyn Handler>>,
}

impl ActionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `route`, replacing any earlier handler.
    pub fn add_route(mut self, route: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.routes.insert(route.into(), handler);
        self
    }

    pub fn has_route(&self, route: &str) -> bool {
        self.routes.contains_key(route)
    }
}

impl Router for ActionRouter {
    fn route(&self, route: &str) -> Option<Arc<dyn Handler>> {
        self.routes.get(route).cloned()
    }
}
