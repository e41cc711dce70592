//! Sub-application mounting.
//!
//! A mount grafts a child [`App`](crate::App)'s dispatch tree under a URL
//! prefix at registration time. Resolution picks the mount whose
//! normalized prefix is the longest prefix of the request path ending on a
//! segment boundary; ties go to the earlier registration. The matched
//! prefix is stripped before the child resolves, so the child observes the
//! relative path as "the" path.

use std::sync::Arc;

use tracing::info;

use crate::dispatcher::App;

pub(crate) struct MountEntry {
    /// Normalized prefix: empty for a root mount, otherwise
    /// `/leading/no-trailing-slash`.
    prefix: String,
    pub(crate) app: Arc<App>,
}

#[derive(Default)]
pub(crate) struct MountTable {
    entries: Vec<MountEntry>,
}

impl MountTable {
    pub(crate) fn insert(&mut self, prefix: &str, app: Arc<App>) {
        let prefix = normalize_prefix(prefix);
        info!(prefix = %prefix, "Sub-application mounted");
        self.entries.push(MountEntry { prefix, app });
    }

    /// Longest matching prefix wins; registration order breaks ties. The
    /// returned path is the prefix-stripped view for the child (`/` when
    /// the prefix consumed the whole path).
    pub(crate) fn resolve(&self, path: &str) -> Option<(&MountEntry, String)> {
        let mut best: Option<&MountEntry> = None;
        for entry in &self.entries {
            if !prefix_matches(&entry.prefix, path) {
                continue;
            }
            // Strictly-longer only, so the earliest registration keeps ties.
            if best.map_or(true, |b| entry.prefix.len() > b.prefix.len()) {
                best = Some(entry);
            }
        }
        best.map(|entry| {
            let stripped = &path[entry.prefix.len()..];
            let rewritten = if stripped.is_empty() {
                "/".to_string()
            } else {
                stripped.to_string()
            };
            (entry, rewritten)
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// A prefix matches only up to a segment boundary: `/api` covers `/api`
/// and `/api/x` but never `/apix`.
fn prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api/"), "/api");
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("/a/b///"), "/a/b");
    }

    #[test]
    fn test_prefix_matches_segment_boundaries_only() {
        assert!(prefix_matches("/api", "/api"));
        assert!(prefix_matches("/api", "/api/items"));
        assert!(!prefix_matches("/api", "/apix"));
        assert!(prefix_matches("", "/anything"));
    }
}
