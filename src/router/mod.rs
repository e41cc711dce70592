//! # Router Module
//!
//! Path matching and route resolution. Routes are registered into a radix
//! tree during setup and resolved with a single descent per request.
//!
//! ## Precedence
//!
//! At every node the matcher tries, in order: exact static edge, the param
//! child (one non-empty segment), the wildcard child (everything left,
//! terminating the descent). Static descent backtracks into captures when
//! a deeper literal dead-ends, so the longest static match wins whenever
//! both could apply.
//!
//! ## Method handling
//!
//! Resolution is method-aware: a path registered only under other methods
//! resolves to nothing, and the caller renders 405 from
//! [`Router::methods_at`]. A route registered under
//! [`MethodFilter::Any`] serves as the fallback for every method at its
//! node.

mod core;
mod radix;
#[cfg(test)]
mod tests;

pub use self::core::{MethodFilter, ParamVec, RouteEntry, RouteMatch, Router, MAX_INLINE_PARAMS};
