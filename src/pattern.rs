//! Route pattern parsing.
//!
//! A pattern is an ordered sequence of segments:
//!
//! - literal: `/users`, compared raw (still percent-encoded) against the
//!   request segment, so reserved characters never suffer a decode/compare
//!   mismatch;
//! - named parameter: `/:id`, matches any single non-empty segment;
//! - single-segment wildcard: `/*`, a parameter bound under its implicit
//!   positional key (the zero-based segment index rendered as a string);
//! - greedy wildcard: `/**` or `/**:name`, final segment only, matches all
//!   remaining segments including none.
//!
//! Patterns are validated at parse time; anything malformed is a
//! [`ConfigError`] and aborts registration.

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;

/// One parsed segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches the identical raw request segment.
    Literal(String),
    /// Matches any single non-empty segment, binding it under the name.
    Param(Arc<str>),
    /// Matches all remaining segments (including zero). Final segment only.
    Wildcard(Arc<str>),
}

/// A parsed, validated route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse and validate a pattern string.
    ///
    /// The root pattern `/` parses to the empty segment sequence. A trailing
    /// slash produces an empty segment and is rejected; trailing-slash
    /// requests are served only through an explicit greedy wildcard.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.strip_prefix('/').unwrap_or(raw);
        if trimmed.is_empty() {
            return Ok(Self {
                raw: "/".to_string(),
                segments: Vec::new(),
            });
        }

        let parts: Vec<&str> = trimmed.split('/').collect();
        let last = parts.len() - 1;
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            if part.is_empty() {
                return Err(ConfigError::EmptySegment {
                    pattern: raw.to_string(),
                });
            }
            let segment = if let Some(rest) = part.strip_prefix("**") {
                let name = match rest.strip_prefix(':') {
                    None if rest.is_empty() => implicit_name(index),
                    Some(name) if !name.is_empty() => Arc::from(name),
                    _ => {
                        return Err(ConfigError::EmptySegment {
                            pattern: raw.to_string(),
                        })
                    }
                };
                if index != last {
                    return Err(ConfigError::WildcardNotLast {
                        pattern: raw.to_string(),
                    });
                }
                Segment::Wildcard(name)
            } else if *part == "*" {
                Segment::Param(implicit_name(index))
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(ConfigError::EmptySegment {
                        pattern: raw.to_string(),
                    });
                }
                Segment::Param(Arc::from(name))
            } else {
                Segment::Literal((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Unnamed wildcards bind under their zero-based segment position.
fn implicit_name(index: usize) -> Arc<str> {
    Arc::from(index.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root() {
        let p = RoutePattern::parse("/").unwrap();
        assert!(p.segments().is_empty());
    }

    #[test]
    fn test_parse_mixed_segments() {
        let p = RoutePattern::parse("/users/:id/files/**:rest").unwrap();
        assert_eq!(
            p.segments(),
            &[
                Segment::Literal("users".to_string()),
                Segment::Param(Arc::from("id")),
                Segment::Literal("files".to_string()),
                Segment::Wildcard(Arc::from("rest")),
            ]
        );
    }

    #[test]
    fn test_unnamed_wildcards_get_positional_names() {
        let p = RoutePattern::parse("/a/*/**").unwrap();
        assert_eq!(
            p.segments(),
            &[
                Segment::Literal("a".to_string()),
                Segment::Param(Arc::from("1")),
                Segment::Wildcard(Arc::from("2")),
            ]
        );
    }

    #[test]
    fn test_rejects_empty_segment() {
        assert!(matches!(
            RoutePattern::parse("/a//b"),
            Err(ConfigError::EmptySegment { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/a/"),
            Err(ConfigError::EmptySegment { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/a/:"),
            Err(ConfigError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_rejects_inner_greedy_wildcard() {
        assert!(matches!(
            RoutePattern::parse("/files/**/meta"),
            Err(ConfigError::WildcardNotLast { .. })
        ));
    }
}
