//! Route construction errors.
//!
//! Only table construction can fail. Dispatch always produces a result.

use thiserror::Error;

/// Errors raised while compiling a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Template has no segments and is not the root route `/`.
    #[error("route template {0:?} has no segments")]
    EmptyTemplate(String),

    /// A `*` segment appears somewhere other than the end.
    #[error("route template {template:?}: wildcard must be the final segment (found at position {position})")]
    WildcardNotLast { template: String, position: usize },

    /// A `:` segment with nothing after it.
    #[error("route template {template:?}: capture at position {position} has no name")]
    EmptyCaptureName { template: String, position: usize },
}

/// Errors raised while building route tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// One of the table's templates failed to compile.
    #[error("invalid route in table {table:?} for module {module:?}: {source}")]
    Pattern {
        table: String,
        module: String,
        #[source]
        source: PatternError,
    },
}
