//! Terminal handlers.

use crate::context::Context;
use crate::response::Outcome;

/// The final unit of a chain, expected to produce the substantive response.
///
/// Plain closures of the matching shape implement this automatically:
///
/// ```rust,ignore
/// app.get("/hello/:name", |ctx: &mut Context| {
///     let name = ctx.param("name").unwrap_or("world").to_string();
///     Ok(Payload::Text(format!("hello {name}")))
/// })?;
/// ```
pub trait Handler: Send + Sync {
    fn call(&self, ctx: &mut Context) -> Outcome;
}

impl<F> Handler for F
where
    F: Fn(&mut Context) -> Outcome + Send + Sync,
{
    fn call(&self, ctx: &mut Context) -> Outcome {
        self(ctx)
    }
}
