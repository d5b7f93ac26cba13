//! Per-request match state.

use std::collections::HashMap;

use crate::pattern::Capture;

/// Named captures extracted from matched patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: HashMap<String, String>,
}

impl PathParams {
    /// Creates new empty path params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Gets a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Parses a parameter as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if no parameters were captured.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// What the router learned while matching a request.
///
/// A fresh context is derived at every nesting level a request passes through;
/// values are never shared between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    params: PathParams,
    unnamed: Vec<String>,
    patterns: Vec<String>,
    /// Path a nested router dispatches on instead of the request path.
    mount_path: Option<String>,
}

impl MatchContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Named captures from every level matched so far.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Gets a named capture.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Unnamed captures, in match order across levels.
    pub fn unnamed(&self) -> &[String] {
        &self.unnamed
    }

    /// Pattern sources matched so far, outermost first.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// The pattern trail joined with commas, e.g. `^/route1/(.*)$,^foo$`.
    pub fn pattern(&self) -> String {
        self.patterns.join(",")
    }

    /// The remainder a nested router would receive: the last unnamed capture
    /// of any level matched so far.
    pub fn remainder(&self) -> Option<&str> {
        self.unnamed.last().map(String::as_str)
    }

    /// The path set by an enclosing sub-router delegation, if any.
    pub fn mount_path(&self) -> Option<&str> {
        self.mount_path.as_deref()
    }

    /// Derives the context for a route matched at the next level.
    pub(crate) fn derive(&self, pattern: &str, captures: Vec<Capture>) -> Self {
        let mut next = self.clone();

        for capture in captures {
            match capture.name {
                Some(name) => next.params.insert(name, capture.value),
                None => next.unnamed.push(capture.value),
            }
        }

        next.patterns.push(pattern.to_string());
        next
    }

    /// Derives the context handed to a nested router: the remainder becomes
    /// the path it dispatches on.
    pub(crate) fn descend(&self) -> Self {
        let mut next = self.clone();
        next.mount_path = Some(self.remainder().unwrap_or_default().to_string());
        next
    }
}
