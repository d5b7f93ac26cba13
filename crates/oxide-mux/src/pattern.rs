//! Route pattern compilation and matching.

use regex::Regex;

use crate::error::{Result, RouterError};

/// A single sub-match produced by [`Pattern::match_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// The group name, if the group was declared as `(?P<name>...)`.
    pub name: Option<String>,
    /// The matched text. Groups that did not participate yield an empty string.
    pub value: String,
}

/// A compiled route pattern.
///
/// Patterns are plain regular expressions evaluated against the request path.
/// Nothing is anchored implicitly: `^/users$` matches exactly `/users`, while
/// `/users` matches any path containing it.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Compiled regex for matching.
    regex: Regex,
    /// Declared group names in group order, `None` for unnamed groups.
    group_names: Vec<Option<String>>,
}

impl Pattern {
    /// Compiles a pattern string.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_mux::Pattern;
    ///
    /// let pattern = Pattern::compile(r"^/posts/(?P<id>\d+)/(.*)$").unwrap();
    /// let captures = pattern.match_path("/posts/42/comments").unwrap();
    /// assert_eq!(captures[0].name.as_deref(), Some("id"));
    /// assert_eq!(captures[0].value, "42");
    /// assert_eq!(captures[1].name, None);
    /// assert_eq!(captures[1].value, "comments");
    /// ```
    pub fn compile(source: &str) -> Result<Self> {
        let regex = Regex::new(source).map_err(|source_err| RouterError::InvalidPattern {
            pattern: source.to_string(),
            source: source_err,
        })?;
        let group_names = regex
            .capture_names()
            .skip(1)
            .map(|name| name.map(str::to_string))
            .collect();

        Ok(Self { regex, group_names })
    }

    /// Attempts to match a path against this pattern.
    ///
    /// Returns every capture group in declaration order if the path matches.
    pub fn match_path(&self, path: &str) -> Option<Vec<Capture>> {
        let caps = self.regex.captures(path)?;

        let captures = self
            .group_names
            .iter()
            .enumerate()
            .map(|(i, name)| Capture {
                name: name.clone(),
                value: caps
                    .get(i + 1)
                    .map_or_else(String::new, |m| m.as_str().to_string()),
            })
            .collect();

        Some(captures)
    }

    /// Returns the original pattern string.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the declared group names, `None` for unnamed groups.
    pub fn group_names(&self) -> &[Option<String>] {
        &self.group_names
    }
}
