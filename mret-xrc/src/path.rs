//! Dot-delimited attribute paths.

use mret_schema::Category;
use std::fmt;

/// Address of one attribute inside a staged entity, e.g.
/// `OBJECT.TRANSFORM.POSITION.X`.
///
/// Paths start at a category root and grow one segment at a time, so the same
/// type always lands under the same prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributePath(String);

impl AttributePath {
    pub const SEPARATOR: char = '.';

    /// Root path for entities of `category`.
    #[must_use]
    pub fn root(category: Category) -> Self {
        Self(category.key_root().to_string())
    }

    /// Appends one segment.
    #[must_use]
    pub fn child(&self, segment: impl fmt::Display) -> Self {
        Self(format!("{}{}{}", self.0, Self::SEPARATOR, segment))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `other` is this path or lies below it.
    #[must_use]
    pub fn contains(&self, other: &str) -> bool {
        other == self.0
            || other
                .strip_prefix(self.0.as_str())
                .is_some_and(|rest| rest.starts_with(Self::SEPARATOR))
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AttributePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
