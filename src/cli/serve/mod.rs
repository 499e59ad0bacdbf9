//! Development server for built assets.
//!
//! `GET /assets/<rel>` serves `<build_dir>/build/assets/<rel>`. Everything
//! else is a 404; methods other than GET and HEAD get 405.

mod lifecycle;
mod path;
mod response;

pub use path::ROUTE_PREFIX;

use crate::{
    asset::BuildContext,
    cli::build::build_assets,
    core::is_shutdown,
    debug, log,
    utils::mime::MimeTable,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tiny_http::{Method, Request, Server};

/// Worker threads answering requests.
const REQUEST_THREADS: usize = 4;

/// Build (unless `no_build`), bind, and serve until Ctrl+C.
pub fn serve_assets(ctx: &BuildContext, no_build: bool) -> Result<()> {
    if !no_build {
        build_assets(ctx, false)?;
    }
    if is_shutdown() {
        return Ok(());
    }

    bind_server(ctx)?.run(ctx)
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
}

/// Bind the HTTP server without starting the request loop
pub fn bind_server(ctx: &BuildContext) -> Result<BoundServer> {
    let serve = &ctx.config.serve;
    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);

    lifecycle::register_for_shutdown(&server);

    log!("serve"; "http://{}{}", addr, ROUTE_PREFIX);
    debug!(
        "serve";
        "serving {}",
        ctx.config.root_relative(&ctx.output_root).display()
    );

    Ok(BoundServer { server })
}

impl BoundServer {
    /// Start the request loop (blocking until the server is unblocked).
    pub fn run(self, ctx: &BuildContext) -> Result<()> {
        let handler = AssetHandler::new(ctx);
        run_request_loop(&self.server, &handler)
    }
}

/// Resolves and answers individual requests. Holds no per-request state.
pub struct AssetHandler {
    root: PathBuf,
    mime: MimeTable,
}

impl AssetHandler {
    pub fn new(ctx: &BuildContext) -> Self {
        Self {
            root: ctx.output_root.clone(),
            mime: ctx.mime_table(),
        }
    }

    /// Handle a single HTTP request
    pub fn handle(&self, request: Request) -> Result<()> {
        // Early exit if shutdown requested
        if is_shutdown() {
            return response::respond_unavailable(request);
        }

        if !matches!(request.method(), Method::Get | Method::Head) {
            return response::respond_method_not_allowed(request);
        }

        match path::resolve_asset(request.url(), &self.root) {
            Some(path) => {
                debug!("serve"; "{} {}", request.method(), request.url());
                let content_type = self.mime.for_path(&path);
                response::respond_file(request, &path, content_type)
            }
            None => {
                debug!("serve"; "404 {}", request.url());
                response::respond_not_found(request)
            }
        }
    }
}

fn run_request_loop(server: &Server, handler: &AssetHandler) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    // Scoped so workers can borrow the handler; returns once the server is
    // unblocked and in-flight requests are answered
    pool.scope(|scope| {
        for request in server.incoming_requests() {
            scope.spawn(move |_| {
                if let Err(e) = handler.handle(request) {
                    log!("serve"; "request error: {:#}", e);
                }
            });
        }
    });

    Ok(())
}
