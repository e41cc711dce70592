//! Route table: registration and resolution.

use std::fmt;
use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;
use tracing::{debug, info};

use super::radix::RadixNode;
use crate::error::ConfigError;
use crate::handler::Handler;
use crate::middleware::Middleware;
use crate::pattern::RoutePattern;

/// Maximum path parameters before heap allocation. Most routes have ≤4.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter bindings for the dispatch hot path.
///
/// Names are `Arc<str>` cloned from the static route tree in O(1); values
/// are per-request strings decoded at bind time.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Which methods a route serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    /// Matches when no route with the exact method does.
    Any,
    Only(Method),
}

impl From<Method> for MethodFilter {
    fn from(method: Method) -> Self {
        MethodFilter::Only(method)
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("ANY"),
            MethodFilter::Only(m) => fmt::Display::fmt(m, f),
        }
    }
}

/// One registered route: method filter, pattern, route-local middleware,
/// terminal handler. Owned by the tree node it terminates at; immutable
/// after registration.
pub struct RouteEntry {
    pub method: MethodFilter,
    pub pattern: RoutePattern,
    pub middleware: Vec<Arc<dyn Middleware>>,
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// A successful resolution: the entry plus its extracted bindings.
pub struct RouteMatch {
    pub entry: Arc<RouteEntry>,
    pub params: ParamVec,
}

impl RouteMatch {
    /// Get a binding by name; last write wins for duplicate names.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Radix-tree route matcher.
///
/// Two-phase lifecycle: `register` during setup (single writer), then
/// concurrent `resolve` while serving. The tree holds no interior
/// mutability, so frozen reads need no locking.
#[derive(Default)]
pub struct Router {
    root: RadixNode,
    routes: usize,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route. Fails on malformed patterns (checked at parse),
    /// duplicate `(method, pattern)` pairs, and capture-name conflicts.
    pub fn register(&mut self, entry: RouteEntry) -> Result<(), ConfigError> {
        let method = entry.method.to_string();
        let pattern = entry.pattern.raw().to_string();
        let entry = Arc::new(entry);
        self.root.insert(entry.pattern.segments(), Arc::clone(&entry))?;
        self.routes += 1;
        info!(
            method = %method,
            pattern = %pattern,
            routes = self.routes,
            "Route registered"
        );
        Ok(())
    }

    /// Resolve a request to a route in a single descent.
    ///
    /// Returns `None` when nothing matches, including when the path exists
    /// under other methods; callers distinguish that case via
    /// [`Router::methods_at`].
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let segments = split_request_path(path);
        let mut params = ParamVec::new();
        let entry = self.root.search(&segments, method, &mut params)?;
        debug!(
            method = %method,
            path = %path,
            pattern = %entry.pattern,
            "Route matched"
        );
        Some(RouteMatch { entry, params })
    }

    /// The methods registered on routes able to serve `path`, sorted and
    /// deduplicated for a deterministic `allow` header. Empty when the
    /// path matches no route under any method.
    pub fn methods_at(&self, path: &str) -> Vec<Method> {
        let segments = split_request_path(path);
        let mut methods = Vec::new();
        self.root.collect_methods(&segments, &mut methods);
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods.dedup();
        methods
    }

    pub fn len(&self) -> usize {
        self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes == 0
    }
}

/// Split a request path into raw segments. The root is the empty sequence;
/// a trailing slash keeps its empty final segment so `/a/` stays distinct
/// from `/a`.
pub(crate) fn split_request_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}
