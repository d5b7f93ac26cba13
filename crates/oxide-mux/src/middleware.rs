//! Middleware that wraps route handlers.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::request::Request;
use crate::response::Response;
use crate::router::Handler;

/// Trait for middleware that wraps the rest of the handler chain.
///
/// Middleware can:
/// - Modify the request before passing it on
/// - Short-circuit processing and return its own response
/// - Modify the response on the way back out
///
/// Middleware is composed into a route's handler once, when the route is
/// registered. For a router with middleware `[a, b]` the route runs
/// `a(b(handler))`: `a` sees the request first and the response last.
///
/// # Example
///
/// ```ignore
/// struct Timing;
///
/// impl Middleware for Timing {
///     fn call<'a>(&'a self, req: Request, next: Handler) -> BoxFuture<'a, Response> {
///         Box::pin(async move {
///             let start = std::time::Instant::now();
///             let res = next(req).await;
///             tracing::info!(elapsed = ?start.elapsed(), status = res.status);
///             res
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync {
    /// Handles the request, calling `next` to continue down the chain.
    fn call<'a>(&'a self, req: Request, next: Handler) -> BoxFuture<'a, Response>;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn call<'a>(&'a self, req: Request, next: Handler) -> BoxFuture<'a, Response> {
        (**self).call(req, next)
    }
}

/// Middleware built from a closure, see [`from_fn`].
pub struct FnMiddleware<F> {
    f: F,
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request, Handler) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call<'a>(&'a self, req: Request, next: Handler) -> BoxFuture<'a, Response> {
        Box::pin((self.f)(req, next))
    }
}

/// Creates middleware from an async closure taking the request and the next
/// handler.
///
/// ```ignore
/// router.middleware(from_fn(|req, next| async move {
///     let res = next(req).await;
///     res.header("X-Served-By", "oxide-mux")
/// }));
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(Request, Handler) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    FnMiddleware { f }
}

/// Wraps `next` in a single middleware, producing a new handler.
pub(crate) fn wrap(mw: Arc<dyn Middleware>, next: Handler) -> Handler {
    Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
        let mw = Arc::clone(&mw);
        let next = Arc::clone(&next);
        Box::pin(async move { mw.call(req, next).await })
    })
}
