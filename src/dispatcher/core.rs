//! Top-level orchestration: one [`App`] owns a route tree, a mount table,
//! and the global middleware, and turns every request descriptor into
//! exactly one response descriptor.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use http::Method;
use tracing::{debug, error};

use crate::context::{Context, RequestDescriptor};
use crate::error::{ConfigError, HttpError};
use crate::handler::Handler;
use crate::middleware::Middleware;
use crate::mount::MountTable;
use crate::pattern::RoutePattern;
use crate::pipeline;
use crate::response::{self, Outcome, ResponseDescriptor};
use crate::router::{MethodFilter, RouteEntry, Router};

/// A dispatch tree: routes, mounts, and global middleware.
///
/// Two-phase lifecycle, enforced by the borrow checker: registration takes
/// `&mut self` and happens before traffic; [`App::handle`] takes `&self`,
/// so a served app (behind an `Arc`) is frozen and safe for unsynchronized
/// concurrent reads.
#[derive(Default)]
pub struct App {
    router: Router,
    mounts: MountTable,
    middleware: Vec<Arc<dyn Middleware>>,
    debug: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose error causes in rendered error bodies. Off by default so
    /// internal detail never leaks unless explicitly requested.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Append global middleware; executes in registration order around
    /// every route and every mounted delegation of this app.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middleware.push(mw);
    }

    /// Register a route with no route-local middleware.
    pub fn route(
        &mut self,
        method: impl Into<MethodFilter>,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), ConfigError> {
        self.route_with(method, pattern, Vec::new(), handler)
    }

    /// Register a route with its own middleware chain, which runs after
    /// the global chain and before the handler.
    pub fn route_with(
        &mut self,
        method: impl Into<MethodFilter>,
        pattern: &str,
        middleware: Vec<Arc<dyn Middleware>>,
        handler: impl Handler + 'static,
    ) -> Result<(), ConfigError> {
        self.router.register(RouteEntry {
            method: method.into(),
            pattern: RoutePattern::parse(pattern)?,
            middleware,
            handler: Arc::new(handler),
        })
    }

    pub fn get(
        &mut self,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), ConfigError> {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post(
        &mut self,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), ConfigError> {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put(
        &mut self,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), ConfigError> {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn delete(
        &mut self,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), ConfigError> {
        self.route(Method::DELETE, pattern, handler)
    }

    pub fn patch(
        &mut self,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), ConfigError> {
        self.route(Method::PATCH, pattern, handler)
    }

    /// Register under the ANY filter: serves every method not claimed by
    /// an exact-method route at the same position.
    pub fn any(
        &mut self,
        pattern: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), ConfigError> {
        self.route(MethodFilter::Any, pattern, handler)
    }

    /// Mount a child app under a prefix. The child's chain stays
    /// self-contained: this app's middleware wraps the delegation frame,
    /// but nothing is copied into the child's tree, and the child never
    /// sees this app's configuration.
    pub fn mount(&mut self, prefix: &str, child: App) {
        self.mounts.insert(prefix, Arc::new(child));
    }

    pub fn route_count(&self) -> usize {
        self.router.len()
    }

    /// Handle one request. Always produces a response: panics, handler
    /// errors, and resolution failures all render; nothing propagates to
    /// the caller.
    pub fn handle(&self, request: RequestDescriptor) -> ResponseDescriptor {
        let mut ctx = Context::new(request, self.debug);
        debug!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            "Dispatch start"
        );
        let outcome = match catch_unwind(AssertUnwindSafe(|| self.dispatch(&mut ctx))) {
            Ok(outcome) => outcome,
            Err(panic) => {
                let panic_message = format!("{panic:?}");
                error!(
                    request_id = %ctx.request_id(),
                    panic_message = %panic_message,
                    "Handler panicked"
                );
                Err(HttpError::internal("internal server error"))
            }
        };
        response::finalize(&mut ctx, outcome)
    }

    /// Resolve and run. Local routes are consulted before mounts, so a
    /// locally registered wildcard shadows any mount covering the same
    /// path. A selected mount's outcome is final; there is no fallback to
    /// other mounts or back to this tree.
    fn dispatch(&self, ctx: &mut Context) -> Outcome {
        if let Some(m) = self.router.resolve(ctx.method(), ctx.path()) {
            ctx.bind_params(m.params);
            let entry = m.entry;
            return pipeline::execute(ctx, &self.middleware, &entry.middleware, |ctx| {
                entry.handler.call(ctx)
            });
        }

        if !self.mounts.is_empty() {
            let selected = self
                .mounts
                .resolve(ctx.path())
                .map(|(entry, rewritten)| (Arc::clone(&entry.app), rewritten));
            if let Some((child, rewritten)) = selected {
                debug!(
                    request_id = %ctx.request_id(),
                    path = %ctx.path(),
                    child_path = %rewritten,
                    "Delegating to mounted app"
                );
                let parent_path = ctx.rewrite_path(rewritten);
                let outcome =
                    pipeline::execute(ctx, &self.middleware, &[], |ctx| child.dispatch(ctx));
                // Restore the parent's view for anything observing the
                // context after delegation.
                let _ = ctx.rewrite_path(parent_path);
                return outcome;
            }
        }

        let allowed = self.router.methods_at(ctx.path());
        if !allowed.is_empty() {
            return Err(HttpError::method_not_allowed(allowed));
        }
        Err(HttpError::not_found())
    }
}
