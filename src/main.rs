//! Demo server: a small app exercising routing, params, wildcards,
//! mounting, redirects, and streaming.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::info;

use trellis::middleware::{MetricsMiddleware, TracingMiddleware};
use trellis::server::{health_endpoint, AppService, HttpServer};
use trellis::{no_content, redirect, stream, App, Context, Outcome, Payload, RuntimeConfig};

#[derive(Parser)]
#[command(name = "trellis", about = "Minimal coroutine-powered HTTP framework demo server")]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,
    /// Expose error causes in error bodies (also TRELLIS_DEBUG).
    #[arg(long)]
    debug: bool,
}

fn hello(ctx: &mut Context) -> Outcome {
    let name = ctx.param("name").unwrap_or("world").to_string();
    Ok(Payload::Text(format!("hello {name}\n")))
}

fn show_file(ctx: &mut Context) -> Outcome {
    let rest = ctx.param("rest").unwrap_or("").to_string();
    Ok(Payload::Json(json!({ "file": rest })))
}

fn events(_ctx: &mut Context) -> Outcome {
    Ok(stream(["one\n", "two\n", "three\n"]))
}

fn api_item(ctx: &mut Context) -> Outcome {
    let id = ctx.param("id").unwrap_or("").to_string();
    Ok(Payload::Json(json!({
        "id": id,
        // The mounted handler sees the stripped path; the original stays
        // introspectable for logging and links.
        "path": ctx.path(),
        "original_path": ctx.original_path(),
    })))
}

fn build_app(debug: bool) -> Result<App> {
    let mut app = App::new();
    app.set_debug(debug);
    app.add_middleware(Arc::new(TracingMiddleware));
    app.add_middleware(Arc::new(MetricsMiddleware::new()));

    app.get("/health", health_endpoint)?;
    app.get("/hello/:name", hello)?;
    app.get("/files/**:rest", show_file)?;
    app.get("/events", events)?;
    app.get("/old", |ctx: &mut Context| -> Outcome {
        Ok(redirect(ctx, "/hello/world", 301))
    })?;
    app.delete("/items/:id", |ctx: &mut Context| -> Outcome {
        Ok(no_content(ctx, None))
    })?;

    let mut api = App::new();
    api.get("/items/:id", api_item)?;
    app.mount("/api", api);

    Ok(app)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let runtime = RuntimeConfig::from_env();
    may::config().set_stack_size(runtime.stack_size);

    let app = build_app(cli.debug || runtime.debug)?;
    info!(routes = app.route_count(), addr = %cli.addr, "Starting server");

    let handle = HttpServer(AppService::new(app)).start(cli.addr.as_str())?;
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))
}
