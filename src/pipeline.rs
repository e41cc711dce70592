//! Chain execution: before-phases in, terminal, after-phases out.
//!
//! The onion composition is implemented with an explicit stack of entered
//! middleware rather than host-language unwinding, so the after-phase
//! guarantee (every middleware that started gets its after-phase, in
//! reverse order, whatever the outcome) holds on every exit path of this
//! one function.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::context::Context;
use crate::middleware::Middleware;
use crate::response::Outcome;

/// Run `outer` then `route` middleware before-phases in order, then the
/// terminal; unwind after-phases over whatever actually entered.
///
/// A before-phase returning a payload short-circuits: nothing downstream
/// of it runs, but its own after-phase and those of everything before it
/// still do. A before-phase error takes the same unwind path with an
/// error outcome, which any after-phase may replace with a recovery
/// payload (or a different error).
pub(crate) fn execute<F>(
    ctx: &mut Context,
    outer: &[Arc<dyn Middleware>],
    route: &[Arc<dyn Middleware>],
    terminal: F,
) -> Outcome
where
    F: FnOnce(&mut Context) -> Outcome,
{
    let start = Instant::now();
    let mut entered: Vec<&Arc<dyn Middleware>> = Vec::with_capacity(outer.len() + route.len());
    let mut short_circuit: Option<Outcome> = None;

    for mw in outer.iter().chain(route.iter()) {
        entered.push(mw);
        match mw.before(ctx) {
            Ok(None) => {}
            Ok(Some(payload)) => {
                debug!(
                    request_id = %ctx.request_id(),
                    entered = entered.len(),
                    "Middleware short-circuited chain"
                );
                short_circuit = Some(Ok(payload));
                break;
            }
            Err(err) => {
                debug!(
                    request_id = %ctx.request_id(),
                    entered = entered.len(),
                    status = err.status(),
                    "Middleware before-phase failed"
                );
                short_circuit = Some(Err(err));
                break;
            }
        }
    }

    let mut outcome = match short_circuit {
        Some(outcome) => outcome,
        None => terminal(ctx),
    };

    let latency = start.elapsed();
    for mw in entered.iter().rev() {
        mw.after(ctx, &mut outcome, latency);
    }

    outcome
}
