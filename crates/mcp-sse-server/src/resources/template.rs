//! URI templates of the form `scheme://literal/{name}/...`.
//!
//! Every placeholder binds exactly one path segment. Matching is positional:
//! the concrete path must have the same number of segments as the template,
//! literal segments must be byte-equal, and placeholders take the segment as
//! is. Bound values are not decoded or validated here; producers do that.

use crate::types::{McpError, McpResult};

/// Split `scheme://path` into its two halves.
pub fn split_uri(uri: &str) -> Option<(&str, &str)> {
    let (scheme, path) = uri.split_once("://")?;
    if scheme.is_empty() {
        return None;
    }
    Some((scheme, path))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    scheme: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Compile a pattern. Fails on a missing scheme, an unbalanced or empty
    /// placeholder, or a placeholder name used twice.
    pub fn compile(pattern: &str) -> McpResult<Self> {
        let (scheme, path) = split_uri(pattern)
            .ok_or_else(|| McpError::Config(format!("URI pattern has no scheme: {pattern}")))?;

        let mut segments = Vec::new();
        for part in path.split('/') {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) => {
                    if name.is_empty() || name.contains(['{', '}']) {
                        return Err(McpError::Config(format!(
                            "invalid placeholder '{part}' in {pattern}"
                        )));
                    }
                    if segments
                        .iter()
                        .any(|s| matches!(s, Segment::Placeholder(n) if n == name))
                    {
                        return Err(McpError::Config(format!(
                            "placeholder '{name}' appears twice in {pattern}"
                        )));
                    }
                    Segment::Placeholder(name.to_string())
                }
                None if part.contains(['{', '}']) => {
                    return Err(McpError::Config(format!(
                        "placeholders must span a whole segment: '{part}' in {pattern}"
                    )));
                }
                None => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            scheme: scheme.to_string(),
            segments,
        })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Placeholder names in path order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// A template without placeholders addresses exactly one URI.
    pub fn is_exact(&self) -> bool {
        self.placeholders().next().is_none()
    }

    /// Match a concrete URI. Returns `None` on any mismatch.
    pub fn matches(&self, uri: &str) -> Option<UriParams> {
        let (scheme, path) = split_uri(uri)?;
        if scheme != self.scheme {
            return None;
        }

        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = UriParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Placeholder(_) if part.is_empty() => return None,
                Segment::Placeholder(name) => params.push(name, part),
            }
        }
        Some(params)
    }

    /// Whether some concrete URI could match both templates.
    pub fn overlaps(&self, other: &UriTemplate) -> bool {
        self.scheme == other.scheme
            && self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Literal(lit), Segment::Placeholder(_))
                    | (Segment::Placeholder(_), Segment::Literal(lit)) => !lit.is_empty(),
                    (Segment::Placeholder(_), Segment::Placeholder(_)) => true,
                })
    }
}

impl std::fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Placeholder bindings from a match, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriParams {
    pairs: Vec<(String, String)>,
}

impl UriParams {
    fn push(&mut self, name: &str, value: &str) {
        self.pairs.push((name.to_string(), value.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like `get`, but a missing binding is an argument error naming it.
    pub fn require(&self, name: &str) -> McpResult<&str> {
        self.get(name)
            .ok_or_else(|| McpError::invalid_argument(name, "missing URI parameter"))
    }

    /// Bound values in path order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
