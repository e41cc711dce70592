//! The `may_minihttp` service bridging transport and dispatcher.

use std::io;
use std::sync::Arc;

use arc_swap::ArcSwap;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use tracing::warn;

use super::request::parse_request;
use super::response::{write_error, write_response};
use crate::context::Context;
use crate::dispatcher::App;
use crate::response::{Outcome, Payload};

/// HTTP service serving one frozen [`App`].
///
/// The app sits behind an `ArcSwap`: request coroutines load it lock-free,
/// and [`AppService::swap`] can atomically replace it with a freshly built
/// one (registration always completes on the new app before the swap, per
/// the build-then-serve lifecycle).
#[derive(Clone)]
pub struct AppService {
    app: Arc<ArcSwap<App>>,
}

impl AppService {
    pub fn new(app: App) -> Self {
        Self {
            app: Arc::new(ArcSwap::from_pointee(app)),
        }
    }

    /// Atomically replace the served app. In-flight requests finish on the
    /// app they loaded.
    pub fn swap(&self, app: App) {
        self.app.store(Arc::new(app));
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let descriptor = match parse_request(req) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!(error = %err, "Malformed request");
                write_error(res, 400, "bad request");
                return Ok(());
            }
        };
        let app = self.app.load();
        write_response(res, app.handle(descriptor));
        Ok(())
    }
}

/// Ready-made health handler returning `{ "status": "ok" }`.
pub fn health_endpoint(_ctx: &mut Context) -> Outcome {
    Ok(Payload::Json(json!({ "status": "ok" })))
}
