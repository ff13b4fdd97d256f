//! The capability a collection handle must offer, and the operations the
//! resolver folds over it.

use std::fmt;

use crate::value::Value;

/// A chainable, persistent collection handle.
///
/// Every call consumes the handle and returns a new one with the named
/// scope composed in. The resolver never inspects the handle; mapping a
/// scope name to a concrete query fragment is the implementor's job.
///
/// # Example
///
/// ```
/// use sift_query::{Collection, Value};
///
/// #[derive(Debug, Default)]
/// struct Sql(Vec<String>);
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("unknown scope {0}")]
/// struct Unknown(String);
///
/// impl Collection for Sql {
///     type Error = Unknown;
///
///     fn apply_scope(mut self, scope: &str, args: &[Value]) -> Result<Self, Unknown> {
///         match scope {
///             "completed" => self.0.push("done = 1".into()),
///             "title_matches" => self.0.push(format!("title LIKE '%{}%'", args[0])),
///             other => return Err(Unknown(other.to_string())),
///         }
///         Ok(self)
///     }
/// }
/// ```
pub trait Collection: Sized {
    /// Failure raised by the backing store, propagated unchanged.
    type Error: std::error::Error + 'static;

    /// Composes the named scope with its arguments into a new handle.
    fn apply_scope(self, scope: &str, args: &[Value]) -> Result<Self, Self::Error>;
}

/// Which declaration produced an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Search,
    Filter,
    Sort,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Search => "search",
            OperationKind::Filter => "filter",
            OperationKind::Sort => "sort",
        }
    }
}

/// A named scope application queued by the resolver.
///
/// Search operations carry the coerced value, filter operations carry no
/// arguments, and sort operations carry a [`Value::Direction`].
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub scope: String,
    pub args: Vec<Value>,
}

impl Operation {
    pub fn search(scope: impl Into<String>, value: Value) -> Self {
        Operation {
            kind: OperationKind::Search,
            scope: scope.into(),
            args: vec![value],
        }
    }

    pub fn filter(scope: impl Into<String>) -> Self {
        Operation {
            kind: OperationKind::Filter,
            scope: scope.into(),
            args: Vec::new(),
        }
    }

    pub fn sort(scope: impl Into<String>, dir: crate::Dir) -> Self {
        Operation {
            kind: OperationKind::Sort,
            scope: scope.into(),
            args: vec![Value::Direction(dir)],
        }
    }

    /// Applies this operation to `collection`.
    pub fn apply<C: Collection>(&self, collection: C) -> Result<C, C::Error> {
        collection.apply_scope(&self.scope, &self.args)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scope)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            write!(f, "({})", args.join(", "))?;
        }
        Ok(())
    }
}
