//! Router nodes, route registration and request dispatch.

use std::future::Future;
use std::sync::{Arc, Weak};

use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::config::RouterConfig;
use crate::error::{Result, RouterError};
use crate::middleware::{self, Middleware};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::route::{MethodKey, Route, RouteTable};

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Boxes an async function into a [`Handler`].
pub fn handler_fn<F, Fut>(handler: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req: Request| -> BoxFuture<'static, Response> { Box::pin(handler(req)) })
}

#[derive(Debug, Clone, Copy)]
enum Fallback {
    NotFound,
    MethodNotAllowed,
}

impl Fallback {
    fn default_response(self) -> Response {
        match self {
            Self::NotFound => Response::not_found(),
            Self::MethodNotAllowed => Response::method_not_allowed(),
        }
    }
}

/// One node of the router tree.
///
/// Inline nodes (from `with`/`group`) have no table of their own and register
/// into their nearest standalone ancestor. Parents own their inline children;
/// every child points back with a weak reference.
struct Node {
    parent: Option<Weak<Node>>,
    routes: Option<RouteTable>,
    middlewares: RwLock<Vec<Arc<dyn Middleware>>>,
    not_found: RwLock<Option<Handler>>,
    method_not_allowed: RwLock<Option<Handler>>,
    children: Mutex<Vec<Arc<Node>>>,
}

impl Node {
    fn build(
        parent: Option<&Arc<Self>>,
        routes: Option<RouteTable>,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        Self {
            parent: parent.map(Arc::downgrade),
            routes,
            middlewares: RwLock::new(middlewares),
            not_found: RwLock::new(None),
            method_not_allowed: RwLock::new(None),
            children: Mutex::new(Vec::new()),
        }
    }

    fn root(config: RouterConfig) -> Arc<Self> {
        let node = Self::build(None, Some(RouteTable::new()), Vec::new());
        *node.not_found.write() = config.not_found;
        *node.method_not_allowed.write() = config.method_not_allowed;
        Arc::new(node)
    }

    fn inline(parent: &Arc<Self>, middlewares: Vec<Arc<dyn Middleware>>) -> Arc<Self> {
        let node = Arc::new(Self::build(Some(parent), None, middlewares));
        parent.children.lock().push(Arc::clone(&node));
        node
    }

    fn standalone(parent: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self::build(Some(parent), Some(RouteTable::new()), Vec::new()))
    }

    fn parent(&self) -> Option<Arc<Self>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    fn is_inline(&self) -> bool {
        self.routes.is_none()
    }

    /// Runs `f` on the table this node registers into.
    fn with_table<R>(&self, f: impl FnOnce(&RouteTable) -> Result<R>) -> Result<R> {
        match &self.routes {
            Some(table) => f(table),
            None => self
                .parent()
                .ok_or(RouterError::DetachedRouter)?
                .with_table(f),
        }
    }

    /// Wraps `handler` in this node's middleware, then in the chain of every
    /// inline ancestor up to the first standalone node.
    fn chain(&self, mut handler: Handler) -> Result<Handler> {
        for mw in self.middlewares.read().iter().rev() {
            handler = middleware::wrap(Arc::clone(mw), handler);
        }
        if self.is_inline() {
            let parent = self.parent().ok_or(RouterError::DetachedRouter)?;
            handler = parent.chain(handler)?;
        }
        Ok(handler)
    }

    fn register(&self, key: MethodKey, pattern: &str, handler: Handler) -> Result<()> {
        let handler = self.chain(handler)?;
        self.with_table(|table| table.insert(key, pattern, handler))
    }

    /// Finds the nearest override for `kind`, walking towards the root.
    fn fallback(&self, kind: Fallback) -> Option<Handler> {
        let slot = match kind {
            Fallback::NotFound => &self.not_found,
            Fallback::MethodNotAllowed => &self.method_not_allowed,
        };
        let handler = slot.read().clone();
        match handler {
            Some(handler) => Some(handler),
            None => self.parent()?.fallback(kind),
        }
    }

    fn dispatch(self: Arc<Self>, mut request: Request) -> BoxFuture<'static, Response> {
        Box::pin(async move {
            let found = {
                let path = request
                    .matched
                    .mount_path()
                    .unwrap_or(request.path.as_str());
                self.with_table(|table| table.find(path, &request.method))
            };

            let kind = match found {
                Ok(route) => {
                    trace!(pattern = %route.pattern, method = %request.method, "route matched");
                    request.matched = request.matched.derive(&route.pattern, route.captures);
                    return (route.handler)(request).await;
                }
                Err(RouterError::MethodNotAllowed { method, path }) => {
                    debug!(%method, %path, "method not allowed");
                    Fallback::MethodNotAllowed
                }
                Err(err) => {
                    debug!(error = %err, "route not found");
                    Fallback::NotFound
                }
            };

            match self.fallback(kind) {
                Some(handler) => handler(request).await,
                None => kind.default_response(),
            }
        })
    }
}

/// A handle to a node in the router tree.
///
/// Cloning a `Router` yields another handle to the same node. Registration
/// takes `&self` and returns `Result<&Self>`, so calls chain with `?`:
///
/// ```ignore
/// let router = Router::new();
/// router
///     .get("^/$", index)?
///     .post("^/posts$", create_post)?;
/// ```
#[derive(Clone)]
pub struct Router {
    node: Arc<Node>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("inline", &self.node.is_inline())
            .field("routes", &self.routes())
            .finish()
    }
}

impl Router {
    /// Creates a new root router with default fallbacks.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Creates a new root router with the given fallback overrides.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            node: Node::root(config),
        }
    }

    /// Returns true if this router shares its parent's route table.
    pub fn is_inline(&self) -> bool {
        self.node.is_inline()
    }

    /// Returns the routes of the table this router registers into, in scan
    /// order.
    pub fn routes(&self) -> Vec<Arc<Route>> {
        self.node
            .with_table(|table| Ok(table.snapshot()))
            .map(|routes| Vec::clone(&routes))
            .unwrap_or_default()
    }

    /// Appends middleware.
    ///
    /// Only routes registered afterwards are wrapped by it.
    pub fn middleware(&self, mw: impl Middleware + 'static) -> &Self {
        self.node.middlewares.write().push(Arc::new(mw));
        self
    }

    /// Appends several middlewares, in order.
    pub fn middlewares<I>(&self, mws: I) -> &Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.node.middlewares.write().extend(mws);
        self
    }

    /// Creates an inline router with one extra middleware.
    ///
    /// Routes registered on it land in this router's table and run through
    /// this router's middleware, then `mw`.
    pub fn with(&self, mw: impl Middleware + 'static) -> Self {
        let mw: Arc<dyn Middleware> = Arc::new(mw);
        self.with_middlewares([mw])
    }

    /// Creates an inline router whose own middleware list is `mws`.
    pub fn with_middlewares<I>(&self, mws: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        Self {
            node: Node::inline(&self.node, mws.into_iter().collect()),
        }
    }

    /// Creates an inline router and populates it in `build`.
    pub fn group<F>(&self, build: F) -> Result<Self>
    where
        F: FnOnce(&Self) -> Result<()>,
    {
        let group = self.with_middlewares(Vec::new());
        build(&group)?;
        Ok(group)
    }

    /// Mounts a sub-router populated in `build` under `pattern`.
    ///
    /// The sub-router has its own table and middleware. Requests matching
    /// `pattern` are dispatched into it using the last unnamed capture of the
    /// match as the path (the empty string if there is none). Named captures
    /// of the outer match remain visible to the sub-router's handlers. The
    /// sub-router falls back to this router's not-found and
    /// method-not-allowed handlers unless it sets its own.
    ///
    /// ```ignore
    /// router.route(r"^/api/(.*)$", |api| {
    ///     api.get("^users$", list_users)?;
    ///     Ok(())
    /// })?;
    /// ```
    pub fn route<F>(&self, pattern: &str, build: F) -> Result<Self>
    where
        F: FnOnce(&Self) -> Result<()>,
    {
        let sub = Self {
            node: Node::standalone(&self.node),
        };
        build(&sub)?;

        let node = Arc::clone(&sub.node);
        let delegate: Handler = Arc::new(move |mut req: Request| -> BoxFuture<'static, Response> {
            req.matched = req.matched.descend();
            Node::dispatch(Arc::clone(&node), req)
        });
        self.method_handler(MethodKey::All, pattern, delegate)?;
        debug!(pattern, "mounted sub-router");
        Ok(sub)
    }

    /// Registers a prebuilt handler for every method on `pattern`.
    ///
    /// The handler sees the request path unchanged.
    pub fn mount(&self, pattern: &str, handler: Handler) -> Result<&Self> {
        self.method_handler(MethodKey::All, pattern, handler)
    }

    /// Registers an async function for every method on `pattern`.
    pub fn all<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(MethodKey::All, pattern, handler)
    }

    /// Registers an async function for `method` on `pattern`.
    pub fn method<M, F, Fut>(&self, method: M, pattern: &str, handler: F) -> Result<&Self>
    where
        M: Into<MethodKey>,
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method_handler(method, pattern, handler_fn(handler))
    }

    /// Registers a prebuilt handler for `method` on `pattern`.
    ///
    /// The handler is wrapped in the current middleware chain right away.
    /// Registering a pattern string that is already in the table adds the
    /// method to that route without moving it.
    pub fn method_handler<M>(&self, method: M, pattern: &str, handler: Handler) -> Result<&Self>
    where
        M: Into<MethodKey>,
    {
        self.node.register(method.into(), pattern, handler)?;
        Ok(self)
    }

    /// Adds a GET route.
    pub fn get<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(Method::Get, pattern, handler)
    }

    /// Adds a POST route.
    pub fn post<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(Method::Post, pattern, handler)
    }

    /// Adds a PUT route.
    pub fn put<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(Method::Put, pattern, handler)
    }

    /// Adds a PATCH route.
    pub fn patch<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(Method::Patch, pattern, handler)
    }

    /// Adds a DELETE route.
    pub fn delete<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(Method::Delete, pattern, handler)
    }

    /// Adds a HEAD route.
    pub fn head<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(Method::Head, pattern, handler)
    }

    /// Adds an OPTIONS route.
    pub fn options<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(Method::Options, pattern, handler)
    }

    /// Adds a CONNECT route.
    pub fn connect<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(Method::Connect, pattern, handler)
    }

    /// Adds a TRACE route.
    pub fn trace<F, Fut>(&self, pattern: &str, handler: F) -> Result<&Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.method(Method::Trace, pattern, handler)
    }

    /// Overrides the handler used when no route matches.
    pub fn not_found<F, Fut>(&self, handler: F) -> &Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        *self.node.not_found.write() = Some(handler_fn(handler));
        self
    }

    /// Overrides the handler used when a route matches but not the method.
    pub fn method_not_allowed<F, Fut>(&self, handler: F) -> &Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        *self.node.method_not_allowed.write() = Some(handler_fn(handler));
        self
    }

    /// Handles an incoming request.
    pub fn handle(&self, request: Request) -> BoxFuture<'static, Response> {
        Node::dispatch(Arc::clone(&self.node), request)
    }

    /// Converts this router into a handler that can be mounted elsewhere.
    pub fn into_handler(self) -> Handler {
        let node = self.node;
        Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
            Node::dispatch(Arc::clone(&node), req)
        })
    }
}
