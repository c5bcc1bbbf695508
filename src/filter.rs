//! Exclusion of system library locations.

/// Locations supplied by macOS itself.
pub const SYSTEM_LIBRARY_PATTERNS: [&str; 2] = ["/usr/lib/", "/System/"];

/// Ordered substring patterns; a dependency matching any of them is never
/// copied into the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    patterns: Vec<String>,
}

impl PathFilter {
    /// A filter that excludes nothing.
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns the first pattern contained in `path`, if any.
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| path.contains(pattern))
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.matching_pattern(path).is_some()
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        SYSTEM_LIBRARY_PATTERNS.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PathFilter {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            patterns: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for PathFilter {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.patterns.extend(iter.into_iter().map(Into::into));
    }
}
