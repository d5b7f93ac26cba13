//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No route matched the request.
    #[error("no route matched: {method} {path}")]
    NotFound { method: String, path: String },

    /// A route matched the path but has no handler for the method.
    #[error("method not allowed: {method} for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// The pattern could not be compiled.
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern source as registered.
        pattern: String,
        /// The regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// An inline router outlived the router it registers into.
    #[error("router is detached from its parent")]
    DetachedRouter,
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
