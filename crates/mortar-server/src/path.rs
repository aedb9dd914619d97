//! Route templates.
//!
//! A template is a `/`-separated list of segments. A segment is either a
//! literal, a `{name}` variable or a `:name` variable. Empty segments are
//! ignored, so `/items/` and `/items` are the same template.

use mortar_core::PathParams;

use crate::RegistrationError;

/// One parsed template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Var(String),
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `path`, rejecting malformed variables.
    pub(crate) fn parse(path: &str) -> Result<Self, RegistrationError> {
        let invalid = |reason: &str| RegistrationError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut segments = Vec::new();
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            let segment = if let Some(inner) = raw.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| invalid("unclosed '{' in segment"))?;
                Segment::Var(name.to_string())
            } else if let Some(name) = raw.strip_prefix(':') {
                Segment::Var(name.to_string())
            } else if raw.contains(['{', '}']) {
                return Err(invalid("braces are only allowed around a whole segment"));
            } else {
                Segment::Literal(raw.to_string())
            };

            if let Segment::Var(name) = &segment {
                if name.is_empty() {
                    return Err(invalid("empty variable name"));
                }
                let taken = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Var(existing) if existing == name));
                if taken {
                    return Err(invalid(&format!("duplicate variable '{name}'")));
                }
            }

            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// Number of path variables.
    pub(crate) fn var_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Var(_)))
            .count()
    }

    /// Number of literal segments, used to prefer specific matches.
    pub(crate) fn literal_count(&self) -> usize {
        self.segments.len() - self.var_count()
    }

    /// Returns `true` if both templates match exactly the same paths.
    pub(crate) fn overlaps(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Var(_), Segment::Var(_)) => true,
                    _ => false,
                })
    }

    /// Matches a concrete request path, capturing variables.
    ///
    /// Literal segments are compared after percent-decoding. Captured values
    /// are kept as they appear in the URI; the binder decodes them.
    pub(crate) fn matches(&self, path: &str) -> Option<PathParams> {
        let mut parts = path.split('/').filter(|s| !s.is_empty());
        let mut params = PathParams::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal)
                    if urlencoding::decode_binary(part.as_bytes()).as_ref() == literal.as_bytes() => {}
                Segment::Literal(_) => return None,
                Segment::Var(name) => params.push(name.clone(), part),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

/// Joins a group prefix and a local path.
pub(crate) fn join(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{path}"),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    }
}
