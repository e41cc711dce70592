use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::context::Context;
use crate::error::HttpError;
use crate::response::{Outcome, Payload};

/// Logs one event when a request enters the chain and one when it leaves,
/// correlated by request id. Passive: never short-circuits, never rewrites
/// the outcome.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, ctx: &mut Context) -> Result<Option<Payload>, HttpError> {
        info!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            "Request start"
        );
        Ok(None)
    }

    fn after(&self, ctx: &mut Context, outcome: &mut Outcome, latency: Duration) {
        match outcome {
            Ok(_) => info!(
                request_id = %ctx.request_id(),
                status = ctx.status(),
                latency_ms = latency.as_millis() as u64,
                "Request complete"
            ),
            Err(err) => info!(
                request_id = %ctx.request_id(),
                status = err.status(),
                latency_ms = latency.as_millis() as u64,
                "Request errored"
            ),
        }
    }
}
