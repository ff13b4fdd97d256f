//! Error types for the sift-query crate.

use thiserror::Error;

/// A declaration was rejected while building a [`QuerySpec`](crate::QuerySpec).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    /// Two search fields or filter groups share a `query[...]` key.
    #[error("duplicate query parameter '{0}' (search fields and filter groups share one namespace)")]
    DuplicateName(String),

    /// A scope list names the same scope twice.
    #[error("scope '{scope}' is listed more than once in '{owner}'")]
    DuplicateScope { owner: String, scope: String },

    /// A filter group or sorting declares no scopes at all.
    #[error("'{0}' declares no scopes")]
    EmptyScopes(String),

    /// The sorting default is not one of its declared scopes.
    #[error("default sort scope '{0}' is not a declared sort scope")]
    UnknownDefaultScope(String),

    /// A constant coercion with nothing to match against.
    #[error("constant coercion for '{0}' has no allowed values")]
    EmptyConstant(String),

    /// A search field refers to a custom coercer that was never registered.
    #[error("search field '{field}' uses unregistered coercion '{kind}'")]
    UnknownCoercion { field: String, kind: String },

    /// The YAML declaration could not be parsed.
    #[error("invalid query declaration: {0}")]
    Config(String),
}

impl From<serde_yaml::Error> for SpecError {
    fn from(err: serde_yaml::Error) -> Self {
        SpecError::Config(err.to_string())
    }
}

/// A raw parameter could not be converted to the requested kind.
///
/// The resolver never surfaces this: a field whose coercion fails is
/// simply inactive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot coerce {input:?} to {kind}: {reason}")]
pub struct CoercionError {
    pub kind: String,
    pub input: String,
    pub reason: String,
}

impl CoercionError {
    pub fn new(kind: impl Into<String>, input: &str, reason: impl Into<String>) -> Self {
        CoercionError {
            kind: kind.into(),
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Fatal failure while folding operations over a collection.
#[derive(Debug, Error)]
pub enum QueryError<E>
where
    E: std::error::Error + 'static,
{
    /// No override collection was supplied and no starting scope was declared.
    #[error("no base collection: supply one or declare a starting scope")]
    MissingBase,

    /// The collection rejected an operation. Passed through untouched.
    #[error(transparent)]
    Collection(E),
}

/// Result type for declaration operations.
pub type Result<T> = std::result::Result<T, SpecError>;
