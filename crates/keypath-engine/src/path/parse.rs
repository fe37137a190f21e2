//! Path expression parsing and interning
//!
//! A path string like `address.city` or `form.items[].label` parses
//! into a linked chain of segments. Parses are interned process-wide by
//! the literal string, so repeated parses of the same path return the
//! same shared, immutable instance.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::error::PathError;

/// Process-wide intern table, keyed by the literal path string
static INTERNED: Lazy<DashMap<String, Arc<PathExpression>>> = Lazy::new(DashMap::new);

/// One parsed path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A plain field name
    Field(Arc<str>),
    /// The whole-children marker `*`
    AllChildren,
    /// A bracketed tag filter `Tag[]`: children whose tag equals `Tag`
    TagFilter(Arc<str>),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{}", name),
            Segment::AllChildren => write!(f, "*"),
            Segment::TagFilter(tag) => write!(f, "{}[]", tag),
        }
    }
}

/// A parsed, immutable path expression: one segment plus the remainder
#[derive(Debug, PartialEq, Eq)]
pub struct PathExpression {
    segment: Segment,
    rest: Option<Arc<PathExpression>>,
}

impl PathExpression {
    /// Parse a path string, returning the shared interned instance
    pub fn parse(path: &str) -> Result<Arc<PathExpression>, PathError> {
        if let Some(hit) = INTERNED.get(path) {
            return Ok(hit.clone());
        }
        let parsed = Self::parse_uncached(path)?;
        // Two racing parsers may both build the chain; the table keeps
        // whichever landed first so later callers share one instance.
        let entry = INTERNED
            .entry(path.to_string())
            .or_insert(parsed)
            .clone();
        Ok(entry)
    }

    fn parse_uncached(path: &str) -> Result<Arc<PathExpression>, PathError> {
        if path.is_empty() {
            return Err(PathError::Malformed {
                path: path.to_string(),
                reason: "empty path".to_string(),
            });
        }
        let mut segments = Vec::new();
        for raw in path.split('.') {
            segments.push(Self::parse_segment(path, raw)?);
        }
        // Build the chain back to front so each node links to its rest.
        let mut rest: Option<Arc<PathExpression>> = None;
        for segment in segments.into_iter().rev() {
            rest = Some(Arc::new(PathExpression { segment, rest }));
        }
        Ok(rest.expect("path has at least one segment"))
    }

    fn parse_segment(path: &str, raw: &str) -> Result<Segment, PathError> {
        if raw.is_empty() {
            return Err(PathError::Malformed {
                path: path.to_string(),
                reason: "empty segment".to_string(),
            });
        }
        if raw == "*" {
            return Ok(Segment::AllChildren);
        }
        if let Some(tag) = raw.strip_suffix("[]") {
            if !is_identifier(tag) {
                return Err(PathError::Malformed {
                    path: path.to_string(),
                    reason: format!("invalid tag filter {:?}", raw),
                });
            }
            return Ok(Segment::TagFilter(Arc::from(tag)));
        }
        if !is_identifier(raw) {
            return Err(PathError::Malformed {
                path: path.to_string(),
                reason: format!("invalid segment {:?}", raw),
            });
        }
        Ok(Segment::Field(Arc::from(raw)))
    }

    /// This node's segment
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// The remainder of the path, or None when this is the last segment
    pub fn rest(&self) -> Option<&Arc<PathExpression>> {
        self.rest.as_ref()
    }

    /// True when this is the last segment
    pub fn is_terminal(&self) -> bool {
        self.rest.is_none()
    }

    /// Number of segments in the chain
    pub fn len(&self) -> usize {
        1 + self.rest.as_ref().map_or(0, |r| r.len())
    }

    /// Never true: a parsed path has at least one segment
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of interned paths (visible for diagnostics)
    pub fn interned_count() -> usize {
        INTERNED.len()
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segment)?;
        if let Some(rest) = &self.rest {
            write!(f, ".{}", rest)?;
        }
        Ok(())
    }
}

/// Field names and tags: leading letter or underscore, then letters,
/// digits, or underscores
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
