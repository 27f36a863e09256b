//! Route-table configuration errors.
//!
//! Every variant is fatal at startup: a route table that fails to build is a
//! programming error in the table, never a transient condition.

use thiserror::Error;

/// Error raised while instantiating templates, expanding groups or building
/// a [`RouteMap`](crate::routing::RouteMap).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Pattern text cannot be parsed.
    #[error("malformed pattern `{pattern}`: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// Variable uses a converter other than `string`.
    #[error("unsupported converter `{converter}` in pattern `{pattern}`")]
    UnsupportedConverter { pattern: String, converter: String },

    /// The same variable name is bound twice in one pattern.
    #[error("variable `{name}` appears more than once in pattern `{pattern}`")]
    DuplicateVariable { pattern: String, name: String },

    /// A rule accepts no methods at all.
    #[error("rule `{pattern}` declares no methods")]
    EmptyMethods { pattern: String },

    /// Template substitution names a placeholder the skeleton never uses.
    #[error("placeholder `${placeholder}` does not occur in the template")]
    MissingPlaceholder { placeholder: String },

    /// A placeholder survived instantiation.
    #[error("unresolved placeholder in `{text}`")]
    UnresolvedPlaceholder { text: String },

    /// An endpoint group tried to bind an endpoint that already names a handler.
    #[error("endpoint for `{pattern}` is already bound to `{handler}`")]
    AlreadyBound { pattern: String, handler: String },

    /// A rule reached the route map without a handler.
    #[error("rule `{pattern}` (endpoint `{endpoint}`) is not bound to a handler")]
    UnboundEndpoint { pattern: String, endpoint: String },

    /// Two expanded rules share a path shape and a method.
    #[error("duplicate route {method} `{pattern}`: `{first}` conflicts with `{second}`")]
    DuplicateRule {
        pattern: String,
        method: String,
        first: String,
        second: String,
    },

    /// The route map references a handler nobody registered.
    #[error("no handler registered for `{handler}`")]
    UnknownHandler { handler: String },
}
