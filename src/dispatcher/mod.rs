//! # Dispatcher Module
//!
//! The dispatcher is the single entry point for a request: it resolves the
//! route (local tree first, then mounts), builds the middleware chain,
//! runs it through the pipeline, and finalizes the outcome through
//! response coercion. It is the one place that must never fail upward:
//! whatever happens inside, the caller gets exactly one well-formed
//! response descriptor.

mod core;

pub use self::core::App;
