//! Decode capabilities a parameter type may opt into.

use std::fmt;
use std::ops::BitOr;

/// Detail tag attached when a parameter's post-validation rejects it.
pub const POST_VALIDATOR_TAG: &str = "post validator error";

/// A request source the binder can decode from.
///
/// Variants are declared in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Structured (JSON) request body.
    Json,
    /// URL query string, or a form-encoded body.
    QueryOrForm,
    /// Route template variables.
    Path,
    /// Request headers.
    Header,
}

impl Source {
    /// All sources in the order the binder applies them.
    pub const ALL: [Self; 4] = [Self::Json, Self::QueryOrForm, Self::Path, Self::Header];

    /// Short tag reported in failure details.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::QueryOrForm => "query or form",
            Self::Path => "path",
            Self::Header => "header",
        }
    }

    /// The capability flag that enables this source.
    #[must_use]
    pub const fn capability(self) -> Capabilities {
        match self {
            Self::Json => Capabilities::JSON,
            Self::QueryOrForm => Capabilities::QUERY_OR_FORM,
            Self::Path => Capabilities::PATH,
            Self::Header => Capabilities::HEADER,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A set of decode capabilities.
///
/// Combine flags with [`union`](Self::union) in `const` position or with `|`
/// elsewhere:
///
/// ```
/// use mortar_extract::{Capabilities, Source};
///
/// const CAPS: Capabilities = Capabilities::JSON.union(Capabilities::HEADER);
///
/// assert!(CAPS.contains(Capabilities::HEADER));
/// assert!(!CAPS.contains(Capabilities::PATH));
/// assert_eq!(CAPS.sources().collect::<Vec<_>>(), vec![Source::Json, Source::Header]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No decode steps; the value is built from defaults only.
    pub const NONE: Self = Self(0);
    /// Decode the request body as JSON.
    pub const JSON: Self = Self(1);
    /// Decode the query string, or a form-encoded body.
    pub const QUERY_OR_FORM: Self = Self(1 << 1);
    /// Decode route template variables.
    pub const PATH: Self = Self(1 << 2);
    /// Decode request headers.
    pub const HEADER: Self = Self(1 << 3);

    /// Returns the union of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if every flag of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the enabled sources in binding order.
    pub fn sources(self) -> impl Iterator<Item = Source> {
        Source::ALL
            .into_iter()
            .filter(move |source| self.contains(source.capability()))
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Capabilities(none)");
        }
        let tags: Vec<&str> = self.sources().map(Source::tag).collect();
        write!(f, "Capabilities({})", tags.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_follow_binding_order() {
        let caps = Capabilities::HEADER | Capabilities::JSON | Capabilities::PATH;
        let sources: Vec<Source> = caps.sources().collect();
        assert_eq!(sources, vec![Source::Json, Source::Path, Source::Header]);
    }

    #[test]
    fn test_none_has_no_sources() {
        assert!(Capabilities::NONE.is_empty());
        assert_eq!(Capabilities::NONE.sources().count(), 0);
        assert!(Capabilities::JSON.contains(Capabilities::NONE));
    }

    #[test]
    fn test_tags() {
        assert_eq!(Source::Json.tag(), "json");
        assert_eq!(Source::QueryOrForm.tag(), "query or form");
        assert_eq!(Source::Path.tag(), "path");
        assert_eq!(Source::Header.tag(), "header");
    }

    #[test]
    fn test_debug_lists_tags() {
        let caps = Capabilities::QUERY_OR_FORM.union(Capabilities::PATH);
        assert_eq!(format!("{caps:?}"), "Capabilities(query or form | path)");
        assert_eq!(format!("{:?}", Capabilities::NONE), "Capabilities(none)");
    }
}
