//! Resolution of request parameters against a declaration.
//!
//! [`Query::new`] resolves everything up front, in a fixed order:
//!
//! 1. search fields, in declaration order: non-blank `query[name]` that
//!    survives coercion queues `name(value)`;
//! 2. filter groups, in declaration order: `query[group]` equal to one of
//!    the group's scopes queues `scope()`;
//! 3. sorting: `sorting` naming a sort scope (else the default scope, if
//!    any) queues `scope(direction)`, where direction is `sort_order` when
//!    it is exactly `"asc"` or `"desc"`, else the default direction.
//!
//! Anything unrecognized is ignored rather than reported. Folding the
//! queued operations over a collection ([`Query::apply_to`],
//! [`Query::scoped`]) finishes with the ending scope, if declared.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::collection::{Collection, Operation};
use crate::error::QueryError;
use crate::params::{is_blank, Params, PAGE_KEY, SORTING_KEY, SORT_ORDER_KEY};
use crate::spec::{FilterGroup, QuerySpec, SearchField, Sorting};
use crate::state::{FilterGroupState, SearchFieldState, SortingState};
use crate::value::{Dir, Value};

/// A declaration resolved against one set of request parameters.
///
/// Immutable once built; every accessor is a pure read.
pub struct Query<C: Collection> {
    spec: Arc<QuerySpec<C>>,
    params: Params,
    fields: Vec<Option<Value>>,
    filters: Vec<Option<usize>>,
    sort_scope: Option<usize>,
    direction: Dir,
    operations: Vec<Operation>,
}

impl<C: Collection> Query<C> {
    /// Resolves `params` against `spec`. Never fails: unusable input just
    /// leaves the corresponding field, group or sort inactive.
    pub fn new(spec: impl Into<Arc<QuerySpec<C>>>, params: Params) -> Self {
        let spec = spec.into();
        let mut operations = Vec::new();

        let fields: Vec<Option<Value>> = spec
            .search_fields()
            .iter()
            .map(|field| {
                let value = resolve_field(&spec, field, &params);
                if let Some(value) = &value {
                    operations.push(Operation::search(&field.name, value.clone()));
                }
                value
            })
            .collect();

        let filters: Vec<Option<usize>> = spec
            .filter_groups()
            .iter()
            .map(|group| {
                let active = resolve_filter(group, &params);
                if let Some(index) = active {
                    operations.push(Operation::filter(&group.scopes[index]));
                }
                active
            })
            .collect();

        let (sort_scope, direction) = match spec.sorting() {
            Some(sorting) => {
                let (scope, dir) = resolve_sorting(sorting, &params);
                if let Some(index) = scope {
                    operations.push(Operation::sort(&sorting.scopes[index], dir));
                }
                (scope, dir)
            }
            None => (None, Dir::default()),
        };

        for op in &operations {
            trace!(kind = op.kind.as_str(), operation = %op, "queued scope");
        }

        Query {
            spec,
            params,
            fields,
            filters,
            sort_scope,
            direction,
            operations,
        }
    }

    pub fn spec(&self) -> &Arc<QuerySpec<C>> {
        &self.spec
    }

    /// The parameters this query was resolved from.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Queued operations, in application order (ending scope excluded).
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// The requested page: a positive integer under `page`, if any.
    pub fn page(&self) -> Option<u64> {
        self.params
            .get_str(PAGE_KEY)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|page| *page > 0)
    }

    /// Search fields in declaration order with their resolved values.
    pub fn search_fields(&self) -> Vec<SearchFieldState<'_>> {
        self.spec
            .search_fields()
            .iter()
            .zip(&self.fields)
            .map(|(field, value)| {
                SearchFieldState::new(field, self.params.query_value(&field.name), value.as_ref())
            })
            .collect()
    }

    pub fn search_field(&self, name: &str) -> Option<SearchFieldState<'_>> {
        self.search_fields().into_iter().find(|f| f.name() == name)
    }

    /// The resolved value of a search field; `None` when inactive.
    pub fn field_value(&self, name: &str) -> Option<&Value> {
        self.spec
            .search_fields()
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| self.fields[i].as_ref())
    }

    /// Filter groups in declaration order with their active scope.
    pub fn filter_groups(&self) -> Vec<FilterGroupState<'_>> {
        self.spec
            .filter_groups()
            .iter()
            .zip(&self.filters)
            .map(|(group, active)| FilterGroupState::new(group, active.map(|i| group.scopes[i].as_str())))
            .collect()
    }

    pub fn filter_group(&self, name: &str) -> Option<FilterGroupState<'_>> {
        self.filter_groups().into_iter().find(|g| g.name() == name)
    }

    /// The active scope of a filter group; `None` when unfiltered.
    pub fn active_filter(&self, group: &str) -> Option<&str> {
        self.spec
            .filter_groups()
            .iter()
            .zip(&self.filters)
            .find(|(g, _)| g.name == group)
            .and_then(|(g, active)| active.map(|i| g.scopes[i].as_str()))
    }

    /// Sorting state, if sorting is declared.
    pub fn sorting(&self) -> Option<SortingState<'_>> {
        self.spec.sorting().map(|sorting| {
            SortingState::new(
                sorting,
                self.sort_scope.map(|i| sorting.scopes[i].as_str()),
                self.direction,
            )
        })
    }

    /// `true` when any search field or filter group is active.
    pub fn is_filtered(&self) -> bool {
        self.fields.iter().any(Option::is_some) || self.filters.iter().any(Option::is_some)
    }

    /// Folds the queued operations over `base`, then runs the ending scope.
    ///
    /// Errors raised by the collection are returned unchanged.
    pub fn apply_to(&self, base: C) -> Result<C, C::Error> {
        let mut collection = base;
        for op in &self.operations {
            trace!(operation = %op, "applying scope");
            collection = op.apply(collection)?;
        }
        match self.spec.ending_scope() {
            Some(end) => end(collection, self),
            None => Ok(collection),
        }
    }

    /// Folds over the declared starting scope.
    pub fn scoped(&self) -> Result<C, QueryError<C::Error>> {
        self.resolve(None)
    }

    /// Folds over `base` when given, else over the starting scope.
    pub fn resolve(&self, base: Option<C>) -> Result<C, QueryError<C::Error>> {
        let base = match base.or_else(|| self.spec.starting_collection()) {
            Some(base) => base,
            None => {
                warn!("query has neither a base collection nor a starting scope");
                return Err(QueryError::MissingBase);
            }
        };
        self.apply_to(base).map_err(QueryError::Collection)
    }
}

impl<C: Collection> Clone for Query<C> {
    fn clone(&self) -> Self {
        Query {
            spec: Arc::clone(&self.spec),
            params: self.params.clone(),
            fields: self.fields.clone(),
            filters: self.filters.clone(),
            sort_scope: self.sort_scope,
            direction: self.direction,
            operations: self.operations.clone(),
        }
    }
}

impl<C: Collection> fmt::Debug for Query<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("params", &self.params)
            .field("operations", &self.operations)
            .finish()
    }
}

fn resolve_field<C: Collection>(
    spec: &QuerySpec<C>,
    field: &SearchField,
    params: &Params,
) -> Option<Value> {
    let raw = params.query_value(&field.name)?;
    if is_blank(raw) {
        debug!(field = %field.name, "search field blank");
        return None;
    }
    match &field.coerce {
        None => Some(Value::String(raw.to_string())),
        Some(kind) => match spec.coercions().coerce(kind, raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(field = %field.name, error = %err, "search field ignored");
                None
            }
        },
    }
}

fn resolve_filter(group: &FilterGroup, params: &Params) -> Option<usize> {
    let raw = params.query_value(&group.name)?;
    let found = group.scopes.iter().position(|scope| scope == raw);
    if found.is_none() {
        debug!(group = %group.name, value = ?raw, "unknown filter value ignored");
    }
    found
}

fn resolve_sorting(sorting: &Sorting, params: &Params) -> (Option<usize>, Dir) {
    let requested = params.get_str(SORTING_KEY);
    let scope = requested
        .and_then(|raw| sorting.scopes.iter().position(|scope| scope == raw))
        .or_else(|| {
            if let Some(raw) = requested {
                debug!(value = ?raw, "unknown sort scope, using default");
            }
            sorting
                .default_scope
                .as_ref()
                .and_then(|default| sorting.scopes.iter().position(|scope| scope == default))
        });

    let dir = match params.get_str(SORT_ORDER_KEY) {
        Some(raw) => Dir::parse(raw).unwrap_or_else(|| {
            debug!(value = ?raw, "unknown sort order, using default");
            sorting.default_direction
        }),
        None => sorting.default_direction,
    };

    (scope, dir)
}
