#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use oxide_mux::{Handler, Method, Middleware, Request, Response, Router, from_fn};

/// Header the `tag` middleware appends its label to.
pub const MIDDLEWARES: &str = "X-Middlewares";

pub async fn call(router: &Router, method: Method, path: &str) -> (u16, String) {
    let res = router.handle(Request::new(method.clone(), path)).await;
    let body = res
        .body_string()
        .unwrap_or_else(|| panic!("Non UTF-8 body for {method} {path}"));
    (res.status, body)
}

pub async fn assert_route(router: &Router, method: Method, path: &str, status: u16, body: &str) {
    let (got_status, got_body) = call(router, method.clone(), path).await;
    assert_eq!(
        (got_status, got_body.as_str()),
        (status, body),
        "Unexpected response for {method} {path}"
    );
}

/// Middleware that appends `label` to the `X-Middlewares` request header.
pub fn tag(label: &'static str) -> impl Middleware {
    from_fn(move |mut req: Request, next: Handler| async move {
        let seen = match req.get_header(MIDDLEWARES) {
            Some(prev) => format!("{prev} {label}"),
            None => label.to_string(),
        };
        req.headers.insert(MIDDLEWARES.to_string(), seen);
        next(req).await
    })
}

/// Responds with the labels collected by `tag` middleware.
pub async fn return_middlewares(req: Request) -> Response {
    Response::text(req.get_header(MIDDLEWARES).unwrap_or_default())
}

/// Responds with the comma-joined pattern trail.
pub async fn return_pattern(req: Request) -> Response {
    Response::text(req.matched.pattern())
}

/// Records events in order across middleware and handlers.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Middleware recording `{name}-before` and `{name}-after`.
    pub fn layer(&self, name: &'static str) -> impl Middleware {
        let recorder = self.clone();
        from_fn(move |req: Request, next: Handler| {
            let recorder = recorder.clone();
            async move {
                recorder.push(format!("{name}-before"));
                let res = next(req).await;
                recorder.push(format!("{name}-after"));
                res
            }
        })
    }

    /// Handler recording `handler`.
    pub fn handler(
        &self,
    ) -> impl Fn(Request) -> std::future::Ready<Response> + Send + Sync + 'static {
        let recorder = self.clone();
        move |_req: Request| {
            recorder.push("handler");
            std::future::ready(Response::ok())
        }
    }
}
