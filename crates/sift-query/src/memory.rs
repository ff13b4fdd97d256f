//! In-memory collection backend.
//!
//! [`Relation`] is a lazy, persistent view over a shared slice of rows.
//! Composing it (`where_`, `order_by`, `limit`, named scopes) only
//! records the step; rows are filtered, sorted and sliced when the
//! relation is loaded.
//!
//! ```
//! use sift_query::memory::{Relation, Scopes};
//! use sift_query::{Params, Query, QuerySpec, Sorting};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Task { title: String, done: bool }
//!
//! let scopes = Scopes::new()
//!     .filter("completed", |t: &Task| t.done)
//!     .filter("pending", |t: &Task| !t.done)
//!     .sort("by_title", |a: &Task, b: &Task| a.title.cmp(&b.title));
//!
//! let tasks = vec![
//!     Task { title: "b".into(), done: false },
//!     Task { title: "a".into(), done: false },
//!     Task { title: "c".into(), done: true },
//! ];
//!
//! let spec = QuerySpec::builder()
//!     .filter_group("status", ["completed", "pending"])
//!     .sorting(Sorting::new(["by_title"]))
//!     .build()
//!     .unwrap();
//!
//! let params = Params::new().with_query("status", "pending").with("sorting", "by_title");
//! let rows = Query::new(spec, params)
//!     .apply_to(Relation::new(tasks, scopes))
//!     .unwrap()
//!     .load();
//! assert_eq!(rows.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), ["a", "b"]);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::collection::Collection;
use crate::value::{Dir, Value};

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A named scope over a [`Relation`].
pub type ScopeFn<T> =
    Arc<dyn Fn(Relation<T>, &[Value]) -> Result<Relation<T>, RelationError> + Send + Sync>;

/// Errors raised by the in-memory backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelationError {
    /// No scope registered under this name.
    #[error("undefined scope '{0}'")]
    UnknownScope(String),

    /// A scope expected an argument and got none.
    #[error("scope '{0}' requires an argument")]
    MissingArgument(String),

    /// A scope got an argument it cannot use.
    #[error("scope '{scope}' cannot use argument: {reason}")]
    InvalidArgument { scope: String, reason: String },
}

/// Named scopes available to a [`Relation`].
pub struct Scopes<T> {
    table: BTreeMap<String, ScopeFn<T>>,
}

impl<T> Default for Scopes<T> {
    fn default() -> Self {
        Scopes {
            table: BTreeMap::new(),
        }
    }
}

impl<T: 'static> Scopes<T> {
    pub fn new() -> Self {
        Scopes::default()
    }

    /// Registers a scope with full control over the relation.
    pub fn scope<F>(mut self, name: impl Into<String>, scope: F) -> Self
    where
        F: Fn(Relation<T>, &[Value]) -> Result<Relation<T>, RelationError> + Send + Sync + 'static,
    {
        self.table.insert(name.into(), Arc::new(scope));
        self
    }

    /// Registers an argument-less scope keeping rows that satisfy `keep`.
    pub fn filter<F>(self, name: impl Into<String>, keep: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let keep: Predicate<T> = Arc::new(keep);
        self.scope(name, move |relation, _args| {
            let keep = Arc::clone(&keep);
            Ok(relation.where_(move |row| keep(row)))
        })
    }

    /// Registers a scope taking one value, keeping rows that satisfy `matches`.
    pub fn search<F>(self, name: impl Into<String>, matches: F) -> Self
    where
        F: Fn(&T, &Value) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        let scope_name = name.clone();
        let matches = Arc::new(matches);
        self.scope(name, move |relation, args| {
            let value = args
                .first()
                .cloned()
                .ok_or_else(|| RelationError::MissingArgument(scope_name.clone()))?;
            let matches = Arc::clone(&matches);
            Ok(relation.where_(move |row| matches(row, &value)))
        })
    }

    /// Registers an ordering scope. The scope's direction argument (if
    /// any) is applied to `compare`.
    pub fn sort<F>(self, name: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let name = name.into();
        let scope_name = name.clone();
        let compare: Comparator<T> = Arc::new(compare);
        self.scope(name, move |relation, args| {
            let dir = match args.first() {
                None => Dir::Asc,
                Some(Value::Direction(dir)) => *dir,
                Some(other) => {
                    return Err(RelationError::InvalidArgument {
                        scope: scope_name.clone(),
                        reason: format!("expected a direction, got {}", other),
                    })
                }
            };
            let compare = Arc::clone(&compare);
            Ok(relation.order_by(move |a, b| compare(a, b), dir))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Registered scope names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    fn get(&self, name: &str) -> Option<ScopeFn<T>> {
        self.table.get(name).cloned()
    }
}

/// A lazily evaluated query over shared rows.
pub struct Relation<T> {
    rows: Arc<[T]>,
    scopes: Arc<Scopes<T>>,
    predicates: Vec<Predicate<T>>,
    orderings: Vec<(Comparator<T>, Dir)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl<T: 'static> Relation<T> {
    /// Creates an unfiltered relation over `rows` with the given scopes.
    pub fn new(rows: impl Into<Arc<[T]>>, scopes: impl Into<Arc<Scopes<T>>>) -> Self {
        Relation {
            rows: rows.into(),
            scopes: scopes.into(),
            predicates: Vec::new(),
            orderings: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Keeps only rows satisfying `keep` (in addition to earlier conditions).
    pub fn where_<F>(mut self, keep: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(keep));
        self
    }

    /// Adds an ordering. Earlier orderings take precedence; later ones
    /// break ties.
    pub fn order_by<F>(mut self, compare: F, dir: Dir) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.orderings.push((Arc::new(compare), dir));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Restricts to one page. Pages are 1-based; page 0 is treated as 1.
    pub fn paginate(self, page: u64, per_page: usize) -> Self {
        let page = usize::try_from(page.max(1)).unwrap_or(usize::MAX);
        self.offset(page.saturating_sub(1).saturating_mul(per_page))
            .limit(per_page)
    }

    pub fn scopes(&self) -> &Scopes<T> {
        &self.scopes
    }

    /// Executes the relation, returning references into the shared rows.
    pub fn rows(&self) -> Vec<&T> {
        let mut results: Vec<&T> = self
            .rows
            .iter()
            .filter(|row| self.predicates.iter().all(|keep| keep(row)))
            .collect();

        if !self.orderings.is_empty() {
            results.sort_by(|a, b| self.compare(a, b));
        }

        let offset = self.offset.unwrap_or(0);
        results
            .into_iter()
            .skip(offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Executes the relation and clones the resulting rows.
    pub fn load(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.rows().into_iter().cloned().collect()
    }

    /// Number of rows [`load`](Self::load) would return.
    pub fn count(&self) -> usize {
        self.rows().len()
    }

    /// Number of matching rows ignoring limit and offset.
    pub fn total_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| self.predicates.iter().all(|keep| keep(row)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        for (compare, dir) in &self.orderings {
            let ordering = dir.apply(compare(a, b));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl<T: 'static> Collection for Relation<T> {
    type Error = RelationError;

    fn apply_scope(self, scope: &str, args: &[Value]) -> Result<Self, RelationError> {
        let apply = self
            .scopes
            .get(scope)
            .ok_or_else(|| RelationError::UnknownScope(scope.to_string()))?;
        apply(self, args)
    }
}

impl<T> Clone for Relation<T> {
    fn clone(&self) -> Self {
        Relation {
            rows: Arc::clone(&self.rows),
            scopes: Arc::clone(&self.scopes),
            predicates: self.predicates.clone(),
            orderings: self.orderings.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<T> fmt::Debug for Relation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("rows", &self.rows.len())
            .field("predicates", &self.predicates.len())
            .field("orderings", &self.orderings.len())
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}
