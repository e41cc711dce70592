use std::time::Duration;

use crate::context::Context;
use crate::error::HttpError;
use crate::response::{Outcome, Payload};

/// A composable unit that runs around a request.
///
/// `before` runs in registration order on the way in; returning
/// `Ok(Some(payload))` short-circuits the chain and sends that payload
/// straight to coercion. `after` runs in reverse order for every
/// middleware whose `before` ran (on success, short-circuit, and failure
/// alike) and may rewrite the outcome, including replacing an error with
/// a recovery payload.
pub trait Middleware: Send + Sync {
    fn before(&self, _ctx: &mut Context) -> Result<Option<Payload>, HttpError> {
        Ok(None)
    }

    fn after(&self, _ctx: &mut Context, _outcome: &mut Outcome, _latency: Duration) {}
}
