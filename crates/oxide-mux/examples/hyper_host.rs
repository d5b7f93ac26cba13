//! Hyper Host Example
//!
//! Serves an `oxide-mux` router over HTTP/1 with hyper.
//! Run with: cargo run --example hyper_host -- --verbose
//! Then try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/v2/library/nginx/manifests/latest
//!   curl -X DELETE http://localhost:3000/v2/library/nginx/manifests/latest
//!   curl -X PURGE http://localhost:3000/cache/library/nginx

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use oxide_mux::{Handler, Method, Request, Response, Router, from_fn};

/// Example registry-style API served by oxide-mux.
#[derive(Parser)]
#[command(name = "hyper-host")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "OXIDE_MUX_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

/// OCI distribution manifest path: a repository name then a tag or digest.
const MANIFEST_PATTERN: &str = concat!(
    "^/v2/(?P<name>[a-z0-9]+(?:[._-][a-z0-9]+)*(?:/[a-z0-9]+(?:[._-][a-z0-9]+)*)*)",
    "/manifests/(?P<reference>.*)$",
);

async fn manifest(req: Request) -> Response {
    Response::json(&serde_json::json!({
        "method": req.method.as_str(),
        "name": req.param("name"),
        "reference": req.param("reference"),
        "patterns": req.matched.patterns(),
    }))
}

fn build_router() -> oxide_mux::Result<Router> {
    let router = Router::new();

    router.middleware(from_fn(|req: Request, next: Handler| async move {
        let method = req.method.clone();
        let path = req.path.clone();
        let res = next(req).await;
        info!(%method, %path, status = res.status, "request");
        res
    }));

    router.get("^/$", |_req| async { Response::text("oxide-mux") })?;

    router.route(MANIFEST_PATTERN, |manifests| {
        manifests
            .head("^$", |_req| async { Response::ok() })?
            .get("^$", manifest)?
            .put("^$", manifest)?
            .delete("^$", manifest)?;
        Ok(())
    })?;

    // Cache invalidation takes any verb, including PURGE.
    router.all("^/cache/(.*)$", |req: Request| async move {
        Response::text(format!(
            "{} {}",
            req.method,
            req.matched.remainder().unwrap_or_default()
        ))
    })?;

    Ok(router)
}

async fn handle_request(
    req: HyperRequest<hyper::body::Incoming>,
    router: Arc<Router>,
) -> Result<HyperResponse<Full<Bytes>>, Infallible> {
    let Some(method) = Method::parse(req.method().as_str()) else {
        return Ok(plain(StatusCode::BAD_REQUEST, "invalid method"));
    };

    // Convert hyper request to oxide_mux Request
    let mut mux_req = Request::new(method, req.uri().path());
    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            mux_req.headers.insert(key.to_string(), v.to_string());
        }
    }
    mux_req.body = match req.collect().await {
        Ok(body) => body.to_bytes().to_vec(),
        Err(err) => {
            error!(error = ?err, "error reading request body");
            return Ok(plain(StatusCode::BAD_REQUEST, "unreadable body"));
        }
    };

    let mux_res = router.handle(mux_req).await;

    // Convert oxide_mux Response to hyper Response
    let mut builder = HyperResponse::builder().status(
        StatusCode::from_u16(mux_res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    );
    for (key, value) in &mux_res.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    Ok(builder
        .body(Full::new(Bytes::from(mux_res.body)))
        .unwrap_or_else(|_| plain(StatusCode::INTERNAL_SERVER_ERROR, "invalid response")))
}

fn plain(status: StatusCode, body: &'static str) -> HyperResponse<Full<Bytes>> {
    let mut res = HyperResponse::new(Full::new(Bytes::from_static(body.as_bytes())));
    *res.status_mut() = status;
    res
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let router = Arc::new(build_router()?);

    let listener = TcpListener::bind(cli.addr).await?;
    info!("oxide-mux listening on http://{}", cli.addr);

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let router = router.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let router = router.clone();
                handle_request(req, router)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!(error = ?err, "error serving connection");
            }
        });
    }
}
