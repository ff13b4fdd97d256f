//! Read-only views of a resolved [`Query`](crate::Query).
//!
//! These are what a view layer consumes to render search inputs, filter
//! toggles and sort links.

use crate::coerce::CoercionKind;
use crate::spec::{FilterGroup, SearchField, Sorting};
use crate::value::{Dir, Value};

/// A search field and what the request supplied for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchFieldState<'a> {
    field: &'a SearchField,
    raw: Option<&'a str>,
    value: Option<&'a Value>,
}

impl<'a> SearchFieldState<'a> {
    pub(crate) fn new(field: &'a SearchField, raw: Option<&'a str>, value: Option<&'a Value>) -> Self {
        SearchFieldState { field, raw, value }
    }

    pub fn name(&self) -> &'a str {
        &self.field.name
    }

    pub fn coercion(&self) -> Option<&'a CoercionKind> {
        self.field.coerce.as_ref()
    }

    /// The string as submitted, even when it failed coercion.
    pub fn raw(&self) -> Option<&'a str> {
        self.raw
    }

    /// The coerced value; `None` when the field is inactive.
    pub fn value(&self) -> Option<&'a Value> {
        self.value
    }

    /// `true` when the field contributes an operation.
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// A filter group and its active scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterGroupState<'a> {
    group: &'a FilterGroup,
    active: Option<&'a str>,
}

impl<'a> FilterGroupState<'a> {
    pub(crate) fn new(group: &'a FilterGroup, active: Option<&'a str>) -> Self {
        FilterGroupState { group, active }
    }

    pub fn name(&self) -> &'a str {
        &self.group.name
    }

    /// Declared scopes, in order.
    pub fn scopes(&self) -> &'a [String] {
        &self.group.scopes
    }

    pub fn active(&self) -> Option<&'a str> {
        self.active
    }

    pub fn is_active(&self, scope: &str) -> bool {
        self.active == Some(scope)
    }

    pub fn is_filtered(&self) -> bool {
        self.active.is_some()
    }
}

/// The sort scopes and the resolved order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortingState<'a> {
    sorting: &'a Sorting,
    active: Option<&'a str>,
    direction: Dir,
}

impl<'a> SortingState<'a> {
    pub(crate) fn new(sorting: &'a Sorting, active: Option<&'a str>, direction: Dir) -> Self {
        SortingState {
            sorting,
            active,
            direction,
        }
    }

    pub fn scopes(&self) -> &'a [String] {
        &self.sorting.scopes
    }

    /// The scope in effect: the requested one, else the default.
    pub fn active(&self) -> Option<&'a str> {
        self.active
    }

    /// The direction in effect. Meaningful even with no active scope,
    /// in which case it is the requested or default direction.
    pub fn direction(&self) -> Dir {
        self.direction
    }

    pub fn default_scope(&self) -> Option<&'a str> {
        self.sorting.default_scope.as_deref()
    }

    pub fn default_direction(&self) -> Dir {
        self.sorting.default_direction
    }

    pub fn is_active(&self, scope: &str) -> bool {
        self.active == Some(scope)
    }

    pub fn is_asc(&self) -> bool {
        self.direction.is_asc()
    }

    pub fn is_desc(&self) -> bool {
        self.direction.is_desc()
    }

    /// Direction for `scope` if it is the active one.
    pub fn direction_of(&self, scope: &str) -> Option<Dir> {
        self.is_active(scope).then_some(self.direction)
    }
}
