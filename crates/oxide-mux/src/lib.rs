//! # oxide-mux
//!
//! A request router that matches paths against regular expressions.
//!
//! This crate provides:
//! - Regex route patterns with named and unnamed captures
//! - HTTP method-based routing with an `ALL` wildcard
//! - Middleware chains composed at registration time
//! - Inline groups sharing a table, and nested sub-routers with their own
//! - Fallback handlers for unmatched paths and methods
//!
//! Patterns are not anchored for you: write `^/users$` to match `/users`
//! exactly. Routes are tried in registration order and the first path match
//! wins.
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_mux::{Request, Response, Router};
//!
//! async fn hello_handler(_req: Request) -> Response {
//!     Response::text("Hello, World!")
//! }
//!
//! async fn user_handler(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(&serde_json::json!({"id": id}))
//! }
//!
//! let router = Router::new();
//! router
//!     .get("^/$", hello_handler)?
//!     .get(r"^/users/(?P<id>\d+)$", user_handler)?;
//!
//! let response = router.handle(Request::get("/users/123")).await;
//! ```
//!
//! ## Captures
//!
//! Named groups are available through [`Request::param`]. Unnamed groups are
//! kept positionally in [`MatchContext::unnamed`]; the last one is what a
//! nested router receives as its path. The list of patterns matched on the
//! way to a handler is in [`MatchContext::patterns`].
//!
//! ## Middleware
//!
//! ```ignore
//! use oxide_mux::{from_fn, Router};
//!
//! let router = Router::new();
//! router.middleware(from_fn(|req, next| async move {
//!     tracing::info!(path = %req.path, "request");
//!     next(req).await
//! }));
//! router.get("^/$", hello_handler)?;
//! ```
//!
//! Middleware only wraps routes registered after it was added.
//!
//! ## Groups and Sub-routers
//!
//! ```ignore
//! router.group(|admin| {
//!     admin.middleware(RequireLogin);
//!     admin.get("^/admin$", dashboard)?;
//!     Ok(())
//! })?;
//!
//! router.route(r"^/api/(.*)$", |api| {
//!     api.get("^users$", list_users)?;
//!     api.get(r"^users/(?P<id>\d+)$", get_user)?;
//!     Ok(())
//! })?;
//! ```

mod config;
mod context;
mod error;
mod middleware;
mod pattern;
mod request;
mod response;
mod route;
mod router;

pub use config::RouterConfig;
pub use context::{MatchContext, PathParams};
pub use error::{Result, RouterError};
pub use futures::future::BoxFuture;
pub use middleware::{FnMiddleware, Middleware, from_fn};
pub use pattern::{Capture, Pattern};
pub use request::{Method, Request};
pub use response::Response;
pub use route::{MethodKey, Route};
pub use router::{Handler, Router, handler_fn};
