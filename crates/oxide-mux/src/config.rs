//! Root router configuration.

use std::future::Future;

use crate::request::Request;
use crate::response::Response;
use crate::router::{Handler, handler_fn};

/// Overrides applied when a root router is constructed.
///
/// Both handlers are optional; without them the router answers with a plain
/// text `not found` (404) or `not allowed` (405).
#[derive(Default, Clone)]
pub struct RouterConfig {
    pub(crate) not_found: Option<Handler>,
    pub(crate) method_not_allowed: Option<Handler>,
}

impl RouterConfig {
    /// Creates a configuration with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handler used when no route matches the path.
    #[must_use]
    pub fn not_found<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.not_found = Some(handler_fn(handler));
        self
    }

    /// Sets the handler used when a route matches but has no handler for the
    /// request method.
    #[must_use]
    pub fn method_not_allowed<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_not_allowed = Some(handler_fn(handler));
        self
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("not_found", &self.not_found.is_some())
            .field("method_not_allowed", &self.method_not_allowed.is_some())
            .finish()
    }
}
