//! Hierarchical symbol addresses.

use std::fmt;
use std::str::FromStr;

/// Ordered chain of sanitized tags from a top-level symbol down to a nested one.
///
/// The canonical string form joins tags with [`TagPath::DELIMITER`], e.g.
/// `MyClass>method`. No escaping exists: sanitized tags never contain `>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagPath {
    tags: Vec<String>,
}

impl TagPath {
    /// Separator between tags in the string form.
    pub const DELIMITER: char = '>';

    /// Create a path from already-sanitized tags.
    #[must_use]
    pub fn new(tags: Vec<String>) -> Self {
        Self { tags }
    }

    /// Split a string on the delimiter. The empty string is the empty path.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from(path: &str) -> Self {
        if path.is_empty() {
            return Self::default();
        }
        Self::new(path.split(Self::DELIMITER).map(str::to_owned).collect())
    }

    /// The tags, outermost first.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True for the path with no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Innermost tag.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.tags.last().map(String::as_str)
    }

    /// Path of the enclosing symbol, `None` for top-level or empty paths.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self.tags.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self::new(rest.to_vec())),
            _ => None,
        }
    }

    /// A new path with `tag` appended.
    #[must_use]
    pub fn join(&self, tag: impl Into<String>) -> Self {
        let mut tags = self.tags.clone();
        tags.push(tag.into());
        Self::new(tags)
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::DELIMITER)?;
            }
            f.write_str(tag)?;
        }
        Ok(())
    }
}

impl FromStr for TagPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}
