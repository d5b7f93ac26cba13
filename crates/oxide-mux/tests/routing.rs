//! Tests for pattern matching and method resolution.

mod common;
use common::*;

use oxide_mux::{
    Method, MethodKey, Request, Response, Result, Router, RouterError, handler_fn,
};

fn basic_router() -> Result<Router> {
    let router = Router::new();
    router
        .get("^/$", |_req| async { Response::text("ok") })?
        .get("^/path$", |_req| async { Response::text("get path") })?
        .post("^/path$", |_req| async { Response::text("post path") })?
        .patch("^/path$", |_req| async { Response::text("patch path") })?
        .get("/(?P<var1>.*)/(?P<var2>.*)/path$", |req: Request| async move {
            let var1 = req.param("var1").unwrap_or_default();
            let var2 = req.param("var2").unwrap_or_default();
            Response::text(format!("{var1} {var2}"))
        })?
        .all("^/allmethods$", |_req| async { Response::text("all methods") })?;
    Ok(router)
}

#[tokio::test]
async fn basic_routes() -> Result<()> {
    let router = basic_router()?;

    assert_route(&router, Method::Get, "/", 200, "ok").await;
    assert_route(&router, Method::Get, "/notfound", 404, "not found").await;
    assert_route(&router, Method::Get, "/path", 200, "get path").await;
    assert_route(&router, Method::Post, "/path", 200, "post path").await;
    assert_route(&router, Method::Patch, "/path", 200, "patch path").await;
    assert_route(&router, Method::Delete, "/path", 405, "not allowed").await;
    assert_route(&router, Method::Get, "/foo/bar/path", 200, "foo bar").await;
    assert_route(&router, Method::Options, "/allmethods", 200, "all methods").await;
    Ok(())
}

#[tokio::test]
async fn missing_path_is_not_found() -> Result<()> {
    let router = basic_router()?;
    assert_route(&router, Method::Get, "/missing", 404, "not found").await;
    Ok(())
}

#[tokio::test]
async fn exact_method_beats_all() -> Result<()> {
    let router = Router::new();
    router
        .all("^/thing$", |_req| async { Response::text("any") })?
        .get("^/thing$", |_req| async { Response::text("get") })?;

    assert_route(&router, Method::Get, "/thing", 200, "get").await;
    assert_route(&router, Method::Put, "/thing", 200, "any").await;
    Ok(())
}

#[tokio::test]
async fn every_verb_registers() -> Result<()> {
    let router = Router::new();
    router
        .get("^/v$", |_req| async { Response::text("GET") })?
        .post("^/v$", |_req| async { Response::text("POST") })?
        .put("^/v$", |_req| async { Response::text("PUT") })?
        .patch("^/v$", |_req| async { Response::text("PATCH") })?
        .delete("^/v$", |_req| async { Response::text("DELETE") })?
        .head("^/v$", |_req| async { Response::ok() })?
        .options("^/v$", |_req| async { Response::text("OPTIONS") })?
        .connect("^/v$", |_req| async { Response::text("CONNECT") })?
        .trace("^/v$", |_req| async { Response::text("TRACE") })?;

    for method in [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Options,
        Method::Connect,
        Method::Trace,
    ] {
        assert_route(&router, method.clone(), "/v", 200, method.as_str()).await;
    }
    assert_route(&router, Method::Head, "/v", 200, "").await;
    assert_eq!(router.routes().len(), 1);
    Ok(())
}

#[tokio::test]
async fn merge_keeps_original_position() -> Result<()> {
    let router = Router::new();
    router
        .get("^/a$", |_req| async { Response::text("get a") })?
        .get("^/(a|b)$", |_req| async { Response::text("get a or b") })?
        .post("^/a$", |_req| async { Response::text("post a") })?
        .post("^/(a|b)$", |_req| async { Response::text("post a or b") })?;

    let patterns: Vec<String> = router
        .routes()
        .iter()
        .map(|r| r.pattern().to_string())
        .collect();
    assert_eq!(patterns, vec!["^/a$", "^/(a|b)$"]);

    // /a still hits the first route for both methods.
    assert_route(&router, Method::Get, "/a", 200, "get a").await;
    assert_route(&router, Method::Post, "/a", 200, "post a").await;
    assert_route(&router, Method::Post, "/b", 200, "post a or b").await;
    Ok(())
}

#[tokio::test]
async fn reregistering_method_overwrites_handler() -> Result<()> {
    let router = Router::new();
    router
        .get("^/x$", |_req| async { Response::text("first") })?
        .get("^/x$", |_req| async { Response::text("second") })?;

    assert_route(&router, Method::Get, "/x", 200, "second").await;
    assert_eq!(router.routes().len(), 1);
    Ok(())
}

#[tokio::test]
async fn first_match_wins_even_without_method() -> Result<()> {
    let router = Router::new();
    router
        .get("^/users/me$", |_req| async { Response::text("me") })?
        .post(r"^/users/(?P<id>\w+)$", |_req| async { Response::text("update") })?;

    // The first route matches the path, so its missing POST entry yields 405.
    assert_route(&router, Method::Post, "/users/me", 405, "not allowed").await;
    assert_route(&router, Method::Post, "/users/42", 200, "update").await;
    Ok(())
}

#[tokio::test]
async fn named_and_unnamed_captures_are_separate() -> Result<()> {
    let router = Router::new();
    router.get(r"^/(?P<user>\w+)/(\w+)/(\d+)$", |req: Request| async move {
        let ctx = &req.matched;
        let named: Vec<(String, String)> = {
            let mut named: Vec<_> = ctx
                .params()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            named.sort();
            named
        };
        Response::text(format!(
            "{:?} {:?} {:?}",
            named,
            ctx.unnamed(),
            ctx.remainder()
        ))
    })?;

    assert_route(
        &router,
        Method::Get,
        "/alice/repos/7",
        200,
        r#"[("user", "alice")] ["repos", "7"] Some("7")"#,
    )
    .await;
    Ok(())
}

#[tokio::test]
async fn unanchored_patterns_match_anywhere() -> Result<()> {
    let router = Router::new();
    router.get("health", |_req| async { Response::text("up") })?;

    assert_route(&router, Method::Get, "/internal/healthz", 200, "up").await;
    Ok(())
}

#[tokio::test]
async fn generic_method_registration() -> Result<()> {
    let router = Router::new();
    router
        .method(Method::Put, "^/m$", |_req| async { Response::text("put") })?
        .method(MethodKey::All, "^/n$", |_req| async { Response::text("all") })?;

    assert_route(&router, Method::Put, "/m", 200, "put").await;
    assert_route(&router, Method::Get, "/m", 405, "not allowed").await;
    assert_route(&router, Method::Trace, "/n", 200, "all").await;
    Ok(())
}

#[tokio::test]
async fn extension_methods_route_like_standard_ones() -> Result<()> {
    let purge = Method::parse("PURGE").expect("valid token");
    let propfind = Method::parse("PROPFIND").expect("valid token");

    let router = Router::new();
    router
        .get("^/only-get$", |_req| async { Response::text("get") })?
        .method(purge.clone(), "^/cache/(.*)$", |req: Request| async move {
            Response::text(format!("purged {}", req.matched.remainder().unwrap_or_default()))
        })?
        .all("^/any$", |req: Request| async move { Response::text(req.method.to_string()) })?
        .mount(
            "^/dav/",
            handler_fn(|req: Request| async move { Response::text(format!("dav {}", req.method)) }),
        )?;

    assert_route(&router, purge.clone(), "/cache/img/a.png", 200, "purged img/a.png").await;
    assert_route(&router, propfind.clone(), "/cache/img/a.png", 405, "not allowed").await;
    assert_route(&router, purge.clone(), "/only-get", 405, "not allowed").await;
    assert_route(&router, propfind.clone(), "/any", 200, "PROPFIND").await;
    assert_route(&router, propfind, "/dav/files", 200, "dav PROPFIND").await;
    assert_route(&router, purge, "/missing", 404, "not found").await;
    Ok(())
}

#[test]
fn invalid_pattern_is_an_error() {
    let router = Router::new();
    let err = router
        .get("^/(?P<bad", |_req| async { Response::ok() })
        .unwrap_err();
    assert!(matches!(
        err,
        RouterError::InvalidPattern { ref pattern, .. } if pattern == "^/(?P<bad"
    ));
    assert!(err.to_string().starts_with("invalid route pattern '^/(?P<bad'"));
}
