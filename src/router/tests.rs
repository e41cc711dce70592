use std::sync::Arc;

use http::Method;

use super::{MethodFilter, RouteEntry, Router};
use crate::context::Context;
use crate::error::ConfigError;
use crate::pattern::RoutePattern;
use crate::response::{Outcome, Payload};

fn noop(_ctx: &mut Context) -> Outcome {
    Ok(Payload::None)
}

fn entry(method: MethodFilter, pattern: &str) -> RouteEntry {
    RouteEntry {
        method,
        pattern: RoutePattern::parse(pattern).unwrap(),
        middleware: Vec::new(),
        handler: Arc::new(noop),
    }
}

fn router(routes: &[(Method, &str)]) -> Router {
    let mut router = Router::new();
    for (method, pattern) in routes {
        router
            .register(entry(MethodFilter::Only(method.clone()), pattern))
            .unwrap();
    }
    router
}

#[test]
fn test_literal_route_matches_exactly() {
    let router = router(&[(Method::GET, "/health")]);
    let m = router.resolve(&Method::GET, "/health").unwrap();
    assert_eq!(m.entry.pattern.raw(), "/health");
    assert!(m.params.is_empty());
    assert!(router.resolve(&Method::GET, "/healthz").is_none());
}

#[test]
fn test_param_binding() {
    let router = router(&[(Method::GET, "/users/:id")]);
    let m = router.resolve(&Method::GET, "/users/42").unwrap();
    assert_eq!(m.param("id"), Some("42"));
}

#[test]
fn test_static_wins_over_param() {
    let router = router(&[(Method::GET, "/a/:x"), (Method::GET, "/a/b")]);
    let m = router.resolve(&Method::GET, "/a/b").unwrap();
    assert_eq!(m.entry.pattern.raw(), "/a/b");
    assert!(m.params.is_empty());

    let m = router.resolve(&Method::GET, "/a/c").unwrap();
    assert_eq!(m.entry.pattern.raw(), "/a/:x");
    assert_eq!(m.param("x"), Some("c"));
}

#[test]
fn test_backtracks_from_static_dead_end() {
    let router = router(&[(Method::GET, "/a/b/x"), (Method::GET, "/a/:p/c")]);
    let m = router.resolve(&Method::GET, "/a/b/c").unwrap();
    assert_eq!(m.entry.pattern.raw(), "/a/:p/c");
    assert_eq!(m.param("p"), Some("b"));
    // No stale bindings survive the abandoned static branch.
    assert_eq!(m.params.len(), 1);
}

#[test]
fn test_greedy_wildcard_captures_remainder() {
    let router = router(&[(Method::GET, "/files/**:rest")]);
    let m = router.resolve(&Method::GET, "/files/a/b/c").unwrap();
    assert_eq!(m.param("rest"), Some("a/b/c"));

    // Zero remaining segments also match.
    let m = router.resolve(&Method::GET, "/files").unwrap();
    assert_eq!(m.param("rest"), Some(""));
}

#[test]
fn test_unnamed_wildcard_binds_positionally() {
    let router = router(&[(Method::GET, "/assets/**")]);
    let m = router.resolve(&Method::GET, "/assets/css/site.css").unwrap();
    assert_eq!(m.param("1"), Some("css/site.css"));
}

#[test]
fn test_single_segment_wildcard() {
    let router = router(&[(Method::GET, "/pets/*/photo")]);
    let m = router.resolve(&Method::GET, "/pets/9/photo").unwrap();
    assert_eq!(m.param("1"), Some("9"));
    assert!(router.resolve(&Method::GET, "/pets/9/10/photo").is_none());
}

#[test]
fn test_method_filtering_and_any_fallback() {
    let mut router = router(&[(Method::GET, "/items")]);
    router
        .register(entry(MethodFilter::Any, "/items"))
        .unwrap();

    let m = router.resolve(&Method::GET, "/items").unwrap();
    assert_eq!(m.entry.method, MethodFilter::Only(Method::GET));

    // Unregistered method falls back to the ANY entry.
    let m = router.resolve(&Method::DELETE, "/items").unwrap();
    assert_eq!(m.entry.method, MethodFilter::Any);
}

#[test]
fn test_methods_at_collects_all_matching_branches() {
    let router = router(&[
        (Method::POST, "/a/b"),
        (Method::GET, "/a/:x"),
        (Method::PUT, "/a/:x"),
    ]);
    assert!(router.resolve(&Method::DELETE, "/a/b").is_none());
    let methods = router.methods_at("/a/b");
    assert_eq!(methods, vec![Method::GET, Method::POST, Method::PUT]);
    assert!(router.methods_at("/nope").is_empty());
}

#[test]
fn test_trailing_slash_is_fail_closed() {
    let router_ab = router(&[(Method::GET, "/a"), (Method::GET, "/b/:x")]);
    assert!(router_ab.resolve(&Method::GET, "/a/").is_none());
    assert!(router_ab.resolve(&Method::GET, "/b/").is_none());

    // Only an explicit trailing wildcard accepts the slash variant.
    let router = router(&[(Method::GET, "/c/**:rest")]);
    let m = router.resolve(&Method::GET, "/c/").unwrap();
    assert_eq!(m.param("rest"), Some(""));
}

#[test]
fn test_root_route() {
    let router = router(&[(Method::GET, "/")]);
    assert!(router.resolve(&Method::GET, "/").is_some());
    assert!(router.resolve(&Method::GET, "/x").is_none());
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut router = router(&[(Method::GET, "/dup")]);
    let err = router
        .register(entry(MethodFilter::Only(Method::GET), "/dup"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateRoute { .. }));
}

#[test]
fn test_param_name_conflict_rejected() {
    let mut router = router(&[(Method::GET, "/users/:id")]);
    let err = router
        .register(entry(MethodFilter::Only(Method::POST), "/users/:user_id"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::ParamNameConflict { .. }));
}

#[test]
fn test_wildcard_name_conflict_rejected() {
    let mut router = router(&[(Method::GET, "/files/**:rest")]);
    let err = router
        .register(entry(MethodFilter::Only(Method::POST), "/files/**:path"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::WildcardNameConflict { .. }));
}

#[test]
fn test_same_param_name_shares_node() {
    let mut router = router(&[(Method::GET, "/users/:id")]);
    router
        .register(entry(MethodFilter::Only(Method::DELETE), "/users/:id"))
        .unwrap();
    let m = router.resolve(&Method::DELETE, "/users/7").unwrap();
    assert_eq!(m.param("id"), Some("7"));
}

#[test]
fn test_captures_decode_once_literals_stay_raw() {
    let router = router(&[(Method::GET, "/users/:id"), (Method::GET, "/a%20b")]);

    let m = router.resolve(&Method::GET, "/users/john%20doe").unwrap();
    assert_eq!(m.param("id"), Some("john doe"));

    // Literal edges compare raw: the encoded registration matches the
    // encoded request and nothing else.
    assert!(router.resolve(&Method::GET, "/a%20b").is_some());
    assert!(router.resolve(&Method::GET, "/a b").is_none());
}

#[test]
fn test_wildcard_capture_decodes_per_segment() {
    let router = router(&[(Method::GET, "/files/**:rest")]);
    let m = router
        .resolve(&Method::GET, "/files/a%20b/c%2Fd")
        .unwrap();
    // Each token decodes once; the encoded slash stays inside its segment.
    assert_eq!(m.param("rest"), Some("a b/c/d"));
}

#[test]
fn test_resolve_is_idempotent() {
    let router = router(&[(Method::GET, "/users/:id/posts/**:rest")]);
    let a = router.resolve(&Method::GET, "/users/1/posts/x/y").unwrap();
    let b = router.resolve(&Method::GET, "/users/1/posts/x/y").unwrap();
    assert!(Arc::ptr_eq(&a.entry, &b.entry));
    assert_eq!(a.params, b.params);
}
