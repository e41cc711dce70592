//! # trellis
//!
//! **trellis** is a minimal, coroutine-powered HTTP framework for Rust: a
//! radix-tree route matcher, an onion-style middleware pipeline, a
//! deterministic response-coercion layer, and sub-application mounting,
//! with a transport adapter for `may_minihttp`.
//!
//! ## Architecture
//!
//! The core is the request dispatch and response-resolution engine; the
//! transport is a replaceable collaborator at the edge:
//!
//! - **[`router`]**: radix-tree path matching: static segments, named
//!   parameters (`:id`), single-segment wildcards (`*`), and trailing
//!   greedy wildcards (`**:rest`), with deterministic precedence and
//!   method-aware resolution.
//! - **[`middleware`]**: the before/after middleware contract plus
//!   ready-made tracing and metrics middleware.
//! - **[`response`]**: the closed coercion table from handler payloads
//!   (text, HTML, JSON, bytes, pull-based streams, explicit no-content)
//!   and structured errors to finalized responses, plus the handler-facing
//!   helpers (`no_content`, `redirect`, `html`, `stream`).
//! - **[`stream`][mod@crate::stream]**: the pull-based chunk source abstraction that stands
//!   in for generators: demand-driven production, skip-aware
//!   serialization, exactly-once cancellation.
//! - **[`dispatcher`]**: the [`App`]: registration surface, mount table,
//!   and the one `handle` entry point that always yields a response.
//! - **[`server`]**: the `may_minihttp` adapter (request parsing,
//!   response writing, service, server lifecycle).
//!
//! ## Request flow
//!
//! ```text
//! transport ─▶ RequestDescriptor ─▶ App::handle
//!                                     ├─ router.resolve (local tree first)
//!                                     ├─ mounts (longest prefix, path rewrite)
//!                                     ├─ pipeline (before → terminal → after)
//!                                     └─ response::finalize ─▶ ResponseDescriptor ─▶ transport
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use trellis::server::{AppService, HttpServer};
//! use trellis::{App, Context, Outcome, Payload};
//!
//! fn hello(ctx: &mut Context) -> Outcome {
//!     let name = ctx.param("name").unwrap_or("world").to_string();
//!     Ok(Payload::Text(format!("hello {name}")))
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = App::new();
//!     app.get("/hello/:name", hello)?;
//!     let handle = HttpServer(AppService::new(app)).start("127.0.0.1:8080")?;
//!     handle.join().ok();
//!     Ok(())
//! }
//! ```
//!
//! ## Lifecycle
//!
//! Registration is a build phase: `App` methods take `&mut self`, fail fast
//! with [`ConfigError`] on malformed patterns or conflicting registrations,
//! and happen before traffic. Serving freezes the app: `handle` takes
//! `&self`, the tree holds no interior mutability, and concurrent requests
//! share nothing but that read-only structure. Each request runs in its own
//! `may` coroutine; blocking I/O inside a handler suspends that coroutine
//! without blocking the rest.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod ids;
pub mod middleware;
mod mount;
pub mod pattern;
mod pipeline;
pub mod response;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod stream;

pub use context::{Body, Context, HeaderVec, RequestDescriptor, MAX_INLINE_HEADERS};
pub use dispatcher::App;
pub use error::{ConfigError, HttpError};
pub use handler::Handler;
pub use ids::RequestId;
pub use response::{
    early_hints, html, no_content, redirect, stream, stream_with, Outcome, Payload, ResponseBody,
    ResponseDescriptor,
};
pub use router::{MethodFilter, ParamVec, MAX_INLINE_PARAMS};
pub use runtime_config::RuntimeConfig;
