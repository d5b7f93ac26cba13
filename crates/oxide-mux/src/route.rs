//! Route entries and the ordered route table.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Result, RouterError};
use crate::pattern::{Capture, Pattern};
use crate::request::Method;
use crate::router::Handler;

/// The method slot a handler is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKey {
    /// Matches any method without a more specific entry.
    All,
    /// Matches exactly one method.
    Only(Method),
}

impl From<Method> for MethodKey {
    fn from(method: Method) -> Self {
        Self::Only(method)
    }
}

impl std::fmt::Display for MethodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Only(method) => write!(f, "{method}"),
        }
    }
}

/// A single route: one pattern and the handlers registered for it.
///
/// Routes are immutable once published in a table; adding a method builds a
/// replacement entry.
#[derive(Clone)]
pub struct Route {
    pattern: Pattern,
    handlers: HashMap<MethodKey, Handler>,
}

impl Route {
    fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            handlers: HashMap::new(),
        }
    }

    /// Returns the pattern source string, which identifies the route.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the declared capture group names.
    pub fn group_names(&self) -> &[Option<String>] {
        self.pattern.group_names()
    }

    /// Returns the method slots registered on this route.
    pub fn methods(&self) -> impl Iterator<Item = MethodKey> + '_ {
        self.handlers.keys().cloned()
    }

    /// Resolves the handler for a method, falling back to the `All` slot.
    fn handler_for(&self, method: &Method) -> Option<&Handler> {
        self.handlers
            .get(&MethodKey::Only(method.clone()))
            .or_else(|| self.handlers.get(&MethodKey::All))
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern())
            .field("methods", &self.methods().collect::<Vec<_>>())
            .finish()
    }
}

/// The outcome of a successful table scan.
pub(crate) struct RouteMatch {
    pub handler: Handler,
    pub pattern: String,
    pub captures: Vec<Capture>,
}

/// An ordered list of routes scanned first-match-wins.
///
/// Readers work on an immutable snapshot; every registration publishes a new
/// vector, so a scan never sees a partially applied change.
pub(crate) struct RouteTable {
    routes: ArcSwap<Vec<Arc<Route>>>,
    mutation: Mutex<()>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: ArcSwap::from_pointee(Vec::new()),
            mutation: Mutex::new(()),
        }
    }

    /// Returns the current routes in scan order.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Route>>> {
        self.routes.load_full()
    }

    /// Adds `handler` under `key` for `pattern`.
    ///
    /// An existing route with the same pattern source keeps its position and
    /// gains (or replaces) the method entry; otherwise a route is appended.
    pub fn insert(&self, key: MethodKey, pattern: &str, handler: Handler) -> Result<()> {
        let _guard = self.mutation.lock();
        let mut routes: Vec<Arc<Route>> = self.routes.load().iter().cloned().collect();

        if let Some(index) = routes.iter().position(|r| r.pattern() == pattern) {
            let mut route = Route::clone(&routes[index]);
            debug!(pattern, method = %key, index, "merged route");
            route.handlers.insert(key, handler);
            routes[index] = Arc::new(route);
        } else {
            let mut route = Route::new(Pattern::compile(pattern)?);
            debug!(pattern, method = %key, index = routes.len(), "added route");
            route.handlers.insert(key, handler);
            routes.push(Arc::new(route));
        }

        self.routes.store(Arc::new(routes));
        Ok(())
    }

    /// Finds the first route matching `path` and resolves its handler.
    pub fn find(&self, path: &str, method: &Method) -> Result<RouteMatch> {
        let routes = self.routes.load();

        for route in routes.iter() {
            let Some(captures) = route.pattern.match_path(path) else {
                continue;
            };

            let Some(handler) = route.handler_for(method) else {
                return Err(RouterError::MethodNotAllowed {
                    method: method.to_string(),
                    path: path.to_string(),
                });
            };

            return Ok(RouteMatch {
                handler: Arc::clone(handler),
                pattern: route.pattern().to_string(),
                captures,
            });
        }

        Err(RouterError::NotFound {
            method: method.to_string(),
            path: path.to_string(),
        })
    }
}
