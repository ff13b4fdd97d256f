//! Sift Query - parameter-driven scope chains for list views.
//!
//! A list screen declares which request parameters it understands:
//!
//! - **search fields**: free-form inputs, optionally coerced to a typed
//!   value, applied as `name(value)`
//! - **filter groups**: sets of mutually exclusive argument-less scopes,
//!   at most one active per group
//! - **sorting**: mutually exclusive ordering scopes with a default scope
//!   and direction
//! - an optional **starting scope** (the base collection) and **ending
//!   scope** (run last, e.g. for pagination)
//!
//! A [`Query`] resolves one request's [`Params`] against that declaration
//! into an ordered list of [`Operation`]s and folds them over any
//! [`Collection`]. Garbage input never fails a request: blank or
//! uncoercible search values, unknown filter values and unknown sort
//! scopes all leave their part of the query inactive.
//!
//! # Quick Start
//!
//! ```rust
//! use sift_query::memory::{Relation, Scopes};
//! use sift_query::{CoercionKind, Dir, Params, Query, QuerySpec, Sorting, Value};
//!
//! #[derive(Clone, Debug)]
//! struct Task {
//!     title: String,
//!     priority: i64,
//!     done: bool,
//! }
//!
//! let scopes = Scopes::new()
//!     .search("title_matches", |t: &Task, v: &Value| {
//!         v.as_str().is_some_and(|s| t.title.contains(s))
//!     })
//!     .search("min_priority", |t: &Task, v: &Value| {
//!         v.as_i64().is_some_and(|min| t.priority >= min)
//!     })
//!     .filter("completed", |t: &Task| t.done)
//!     .filter("pending", |t: &Task| !t.done)
//!     .sort("by_priority", |a: &Task, b: &Task| a.priority.cmp(&b.priority));
//!
//! let spec = QuerySpec::builder()
//!     .search_field("title_matches")
//!     .search_field_as("min_priority", CoercionKind::Integer)
//!     .filter_group("status", ["completed", "pending"])
//!     .sorting(Sorting::new(["by_priority"]).default_scope("by_priority"))
//!     .build()
//!     .unwrap();
//!
//! let tasks = vec![
//!     Task { title: "Fix bug".into(), priority: 5, done: false },
//!     Task { title: "Write docs".into(), priority: 3, done: false },
//!     Task { title: "Old task".into(), priority: 1, done: true },
//! ];
//!
//! let params = Params::from_query_string(
//!     "query[min_priority]=3&query[status]=pending&sort_order=desc",
//! );
//! let query = Query::new(spec, params);
//! assert_eq!(query.active_filter("status"), Some("pending"));
//! assert_eq!(query.sorting().unwrap().direction(), Dir::Desc);
//!
//! let results = query.apply_to(Relation::new(tasks, scopes)).unwrap().load();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].title, "Fix bug");
//! ```
//!
//! # Resolution Order
//!
//! ```text
//! base = override collection, else starting scope, else error
//! base . search fields (declared order)
//!      . filter groups (declared order)
//!      . sort scope
//!      . ending scope
//! ```

mod coerce;
mod collection;
mod error;
pub mod memory;
mod params;
mod query;
mod spec;
mod state;
mod value;

use std::sync::Arc;

// Re-export public API
pub use coerce::{coerce, CoerceFn, CoercionKind, Coercions};
pub use collection::{Collection, Operation, OperationKind};
pub use error::{CoercionError, QueryError, Result, SpecError};
pub use params::{is_blank, Param, Params, PAGE_KEY, QUERY_KEY, SORTING_KEY, SORT_ORDER_KEY};
pub use query::Query;
pub use spec::{
    EndingScope, FilterGroup, QuerySpec, QuerySpecBuilder, SearchField, Sorting, SpecConfig,
    StartingScope,
};
pub use state::{FilterGroupState, SearchFieldState, SortingState};
pub use value::{Dir, Value};

/// A type with a process-wide query declaration.
///
/// Implement it with a `once_cell` static so the declaration is built once
/// and shared by every request:
///
/// ```rust
/// use std::sync::Arc;
///
/// use once_cell::sync::Lazy;
/// use sift_query::memory::Relation;
/// use sift_query::{Declared, Params, QuerySpec, Sorting};
///
/// struct TaskQuery;
///
/// static TASK_QUERY: Lazy<Arc<QuerySpec<Relation<String>>>> = Lazy::new(|| {
///     let spec = QuerySpec::builder()
///         .filter_group("status", ["completed", "pending"])
///         .sorting(Sorting::new(["by_title"]))
///         .build()
///         .expect("task query declaration");
///     Arc::new(spec)
/// });
///
/// impl Declared for TaskQuery {
///     type Collection = Relation<String>;
///
///     fn query_spec() -> Arc<QuerySpec<Self::Collection>> {
///         Arc::clone(&TASK_QUERY)
///     }
/// }
///
/// let query = TaskQuery::query(Params::new().with_query("status", "completed"));
/// assert_eq!(query.active_filter("status"), Some("completed"));
/// ```
pub trait Declared {
    type Collection: Collection;

    /// The shared declaration.
    fn query_spec() -> Arc<QuerySpec<Self::Collection>>;

    /// Resolves `params` against the shared declaration.
    fn query(params: Params) -> Query<Self::Collection> {
        Query::new(Self::query_spec(), params)
    }
}
