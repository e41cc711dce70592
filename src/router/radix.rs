//! Radix tree over route patterns.
//!
//! One node per path segment. Static edges are compared raw (both sides
//! stay percent-encoded), so tree descent never decodes; decoding happens
//! once per captured token when a param or wildcard binds. Each node holds
//! at most one param child and at most one wildcard child; a second,
//! differently named capture at the same position is rejected at
//! registration, because the two would be indistinguishable at match time.
//!
//! Descent precedence at every node, per segment:
//!
//! 1. exact static edge (with backtracking if the deeper descent fails),
//! 2. the param child, binding one non-empty segment,
//! 3. the wildcard child, binding all remaining segments (including none)
//!    and terminating the descent immediately.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use crate::error::ConfigError;
use crate::pattern::Segment;
use crate::router::{MethodFilter, ParamVec, RouteEntry};

#[derive(Default)]
pub(crate) struct RadixNode {
    /// Literal edge label; empty for the root and for capture nodes.
    segment: String,
    /// Binding name when this node is a param or wildcard child.
    capture: Option<Arc<str>>,
    /// Routes terminating here, keyed by method.
    entries: HashMap<Method, Arc<RouteEntry>>,
    /// Route under the ANY method filter, matching when no exact method does.
    any_entry: Option<Arc<RouteEntry>>,
    children: Vec<RadixNode>,
    param_child: Option<Box<RadixNode>>,
    /// Terminal by construction: a wildcard consumes the rest of the path.
    wildcard_child: Option<Box<RadixNode>>,
}

impl RadixNode {
    fn new_literal(segment: String) -> Self {
        Self {
            segment,
            ..Self::default()
        }
    }

    fn new_capture(name: Arc<str>) -> Self {
        Self {
            capture: Some(name),
            ..Self::default()
        }
    }

    pub(crate) fn insert(
        &mut self,
        segments: &[Segment],
        entry: Arc<RouteEntry>,
    ) -> Result<(), ConfigError> {
        let Some((first, rest)) = segments.split_first() else {
            return self.attach(entry);
        };
        match first {
            Segment::Literal(lit) => {
                if let Some(child) = self.children.iter_mut().find(|c| c.segment == *lit) {
                    return child.insert(rest, entry);
                }
                let mut child = RadixNode::new_literal(lit.clone());
                child.insert(rest, entry)?;
                self.children.push(child);
                Ok(())
            }
            Segment::Param(name) => match &mut self.param_child {
                Some(child) => {
                    if child.capture.as_deref() != Some(name.as_ref()) {
                        return Err(ConfigError::ParamNameConflict {
                            existing: child.capture.as_deref().unwrap_or_default().to_string(),
                            offered: name.to_string(),
                            pattern: entry.pattern.raw().to_string(),
                        });
                    }
                    child.insert(rest, entry)
                }
                None => {
                    let mut child = RadixNode::new_capture(Arc::clone(name));
                    child.insert(rest, entry)?;
                    self.param_child = Some(Box::new(child));
                    Ok(())
                }
            },
            // Pattern validation guarantees the wildcard is final, so the
            // entry always attaches directly to the wildcard node.
            Segment::Wildcard(name) => match &mut self.wildcard_child {
                Some(child) => {
                    if child.capture.as_deref() != Some(name.as_ref()) {
                        return Err(ConfigError::WildcardNameConflict {
                            existing: child.capture.as_deref().unwrap_or_default().to_string(),
                            offered: name.to_string(),
                            pattern: entry.pattern.raw().to_string(),
                        });
                    }
                    child.attach(entry)
                }
                None => {
                    let mut child = RadixNode::new_capture(Arc::clone(name));
                    child.attach(entry)?;
                    self.wildcard_child = Some(Box::new(child));
                    Ok(())
                }
            },
        }
    }

    fn attach(&mut self, entry: Arc<RouteEntry>) -> Result<(), ConfigError> {
        match entry.method.clone() {
            MethodFilter::Any => {
                if self.any_entry.is_some() {
                    return Err(ConfigError::DuplicateRoute {
                        method: "ANY".to_string(),
                        pattern: entry.pattern.raw().to_string(),
                    });
                }
                self.any_entry = Some(entry);
                Ok(())
            }
            MethodFilter::Only(method) => {
                if self.entries.contains_key(&method) {
                    return Err(ConfigError::DuplicateRoute {
                        method: method.to_string(),
                        pattern: entry.pattern.raw().to_string(),
                    });
                }
                self.entries.insert(method, entry);
                Ok(())
            }
        }
    }

    fn entry_for(&self, method: &Method) -> Option<Arc<RouteEntry>> {
        self.entries
            .get(method)
            .cloned()
            .or_else(|| self.any_entry.clone())
    }

    pub(crate) fn search(
        &self,
        segments: &[&str],
        method: &Method,
        params: &mut ParamVec,
    ) -> Option<Arc<RouteEntry>> {
        let Some((segment, rest)) = segments.split_first() else {
            if let Some(entry) = self.entry_for(method) {
                return Some(entry);
            }
            // A greedy wildcard also matches zero remaining segments.
            if let Some(wild) = &self.wildcard_child {
                if let (Some(entry), Some(name)) = (wild.entry_for(method), &wild.capture) {
                    params.push((Arc::clone(name), String::new()));
                    return Some(entry);
                }
            }
            return None;
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(entry) = child.search(rest, method, params) {
                    return Some(entry);
                }
            }
        }

        // Params never bind an empty segment: `/a/` stays distinct from
        // `/a` and from `/a/:x` (fail-closed trailing slash policy).
        if !segment.is_empty() {
            if let Some(child) = &self.param_child {
                if let Some(name) = &child.capture {
                    let mark = params.len();
                    params.push((Arc::clone(name), decode_segment(segment)));
                    if let Some(entry) = child.search(rest, method, params) {
                        return Some(entry);
                    }
                    params.truncate(mark);
                }
            }
        }

        if let Some(wild) = &self.wildcard_child {
            if let (Some(entry), Some(name)) = (wild.entry_for(method), &wild.capture) {
                let captured = segments
                    .iter()
                    .map(|s| decode_segment(s))
                    .collect::<Vec<_>>()
                    .join("/");
                params.push((Arc::clone(name), captured));
                return Some(entry);
            }
        }

        None
    }

    /// Collect the methods registered on every route that could serve this
    /// path, across static, param, and wildcard branches. Feeds the 405
    /// `allow` header.
    pub(crate) fn collect_methods(&self, segments: &[&str], out: &mut Vec<Method>) {
        let Some((segment, rest)) = segments.split_first() else {
            out.extend(self.entries.keys().cloned());
            if let Some(wild) = &self.wildcard_child {
                out.extend(wild.entries.keys().cloned());
            }
            return;
        };
        for child in &self.children {
            if child.segment == *segment {
                child.collect_methods(rest, out);
            }
        }
        if !segment.is_empty() {
            if let Some(child) = &self.param_child {
                child.collect_methods(rest, out);
            }
        }
        if let Some(wild) = &self.wildcard_child {
            out.extend(wild.entries.keys().cloned());
        }
    }
}

/// Percent-decode one captured token. Invalid encodings keep the token
/// literal as matched rather than corrupting it with a second guess.
fn decode_segment(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_segment_once() {
        assert_eq!(decode_segment("a%20b"), "a b");
        // %25 decodes to a literal percent, not recursively.
        assert_eq!(decode_segment("100%2525"), "100%25");
    }

    #[test]
    fn test_decode_segment_invalid_stays_raw() {
        assert_eq!(decode_segment("%zz"), "%zz");
    }
}
