//! Query declarations.
//!
//! A [`QuerySpec`] is declared once per kind of list (usually in a
//! `once_cell` static, see [`Declared`](crate::Declared)) and shared by
//! every [`Query`](crate::Query) resolved against it. It is built either in
//! code with [`QuerySpec::builder`] or from YAML with [`SpecConfig`]:
//!
//! ```yaml
//! search_fields:
//!   - name: title_matches
//!   - name: due_date_from
//!     coerce: date
//! filter_groups:
//!   - name: status
//!     scopes: [completed, pending]
//! sorting:
//!   scopes: [by_due_date, by_title]
//!   default_scope: by_title
//!   default_direction: desc
//! ```
//!
//! Declarations are validated when built: names must be unique across
//! search fields and filter groups (both read `query[name]`), scope lists
//! must be non-empty and free of duplicates, and the sort default must be
//! one of the sort scopes.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coerce::{CoercionKind, Coercions};
use crate::collection::Collection;
use crate::error::{CoercionError, Result, SpecError};
use crate::query::Query;
use crate::value::{Dir, Value};

/// Produces the base collection when the caller supplies none.
pub type StartingScope<C> = Arc<dyn Fn() -> C + Send + Sync>;

/// Runs after every other operation, with access to the resolved query
/// (for pagination and the like).
pub type EndingScope<C> =
    Arc<dyn Fn(C, &Query<C>) -> std::result::Result<C, <C as Collection>::Error> + Send + Sync>;

/// A free-form search input, applied as `scope(value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchField {
    /// Request key under `query` and scope name.
    pub name: String,
    /// Coercion applied to the raw string. `None` passes it through.
    ///
    /// In YAML, unit kinds are plain strings (`coerce: date`) and the
    /// others single-key maps (`coerce: {constant: [low, high]}`).
    #[serde(
        default,
        with = "serde_yaml::with::singleton_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub coerce: Option<CoercionKind>,
}

impl SearchField {
    pub fn new(name: impl Into<String>) -> Self {
        SearchField {
            name: name.into(),
            coerce: None,
        }
    }

    pub fn coerced(name: impl Into<String>, kind: CoercionKind) -> Self {
        SearchField {
            name: name.into(),
            coerce: Some(kind),
        }
    }
}

/// Mutually exclusive filter scopes sharing one request key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub name: String,
    pub scopes: Vec<String>,
}

impl FilterGroup {
    pub fn new<I, S>(name: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterGroup {
            name: name.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Mutually exclusive ordering scopes with their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorting {
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scope: Option<String>,
    #[serde(default)]
    pub default_direction: Dir,
}

impl Sorting {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Sorting {
            scopes: scopes.into_iter().map(Into::into).collect(),
            default_scope: None,
            default_direction: Dir::Asc,
        }
    }

    pub fn default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = Some(scope.into());
        self
    }

    pub fn default_direction(mut self, dir: Dir) -> Self {
        self.default_direction = dir;
        self
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Serializable form of a declaration, without callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecConfig {
    #[serde(default)]
    pub search_fields: Vec<SearchField>,
    #[serde(default)]
    pub filter_groups: Vec<FilterGroup>,
    #[serde(default)]
    pub sorting: Option<Sorting>,
}

impl SpecConfig {
    /// Parses a YAML declaration.
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }
}

/// An immutable query declaration.
pub struct QuerySpec<C: Collection> {
    search_fields: Vec<SearchField>,
    filter_groups: Vec<FilterGroup>,
    sorting: Option<Sorting>,
    starting_scope: Option<StartingScope<C>>,
    ending_scope: Option<EndingScope<C>>,
    coercions: Coercions,
}

impl<C: Collection> QuerySpec<C> {
    /// Starts a new declaration.
    pub fn builder() -> QuerySpecBuilder<C> {
        QuerySpecBuilder::new()
    }

    /// Search fields in declaration order.
    pub fn search_fields(&self) -> &[SearchField] {
        &self.search_fields
    }

    /// Filter groups in declaration order.
    pub fn filter_groups(&self) -> &[FilterGroup] {
        &self.filter_groups
    }

    pub fn sorting(&self) -> Option<&Sorting> {
        self.sorting.as_ref()
    }

    pub fn coercions(&self) -> &Coercions {
        &self.coercions
    }

    pub fn has_starting_scope(&self) -> bool {
        self.starting_scope.is_some()
    }

    pub fn search_field(&self, name: &str) -> Option<&SearchField> {
        self.search_fields.iter().find(|f| f.name == name)
    }

    pub fn filter_group(&self, name: &str) -> Option<&FilterGroup> {
        self.filter_groups.iter().find(|g| g.name == name)
    }

    /// Builds a fresh base collection from the starting scope.
    pub fn starting_collection(&self) -> Option<C> {
        self.starting_scope.as_ref().map(|start| start())
    }

    pub(crate) fn ending_scope(&self) -> Option<&EndingScope<C>> {
        self.ending_scope.as_ref()
    }

    /// Returns the callback-free part of this declaration.
    pub fn to_config(&self) -> SpecConfig {
        SpecConfig {
            search_fields: self.search_fields.clone(),
            filter_groups: self.filter_groups.clone(),
            sorting: self.sorting.clone(),
        }
    }
}

impl<C: Collection> fmt::Debug for QuerySpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("search_fields", &self.search_fields)
            .field("filter_groups", &self.filter_groups)
            .field("sorting", &self.sorting)
            .field("starting_scope", &self.starting_scope.is_some())
            .field("ending_scope", &self.ending_scope.is_some())
            .field("coercions", &self.coercions)
            .finish()
    }
}

/// Builder for [`QuerySpec`].
///
/// Search fields and filter groups keep their declaration order. Setting
/// the starting scope, ending scope or sorting again replaces the earlier
/// value.
pub struct QuerySpecBuilder<C: Collection> {
    search_fields: Vec<SearchField>,
    filter_groups: Vec<FilterGroup>,
    sorting: Option<Sorting>,
    starting_scope: Option<StartingScope<C>>,
    ending_scope: Option<EndingScope<C>>,
    coercions: Coercions,
}

impl<C: Collection> Default for QuerySpecBuilder<C> {
    fn default() -> Self {
        QuerySpecBuilder {
            search_fields: Vec::new(),
            filter_groups: Vec::new(),
            sorting: None,
            starting_scope: None,
            ending_scope: None,
            coercions: Coercions::new(),
        }
    }
}

impl<C: Collection> QuerySpecBuilder<C> {
    pub fn new() -> Self {
        QuerySpecBuilder::default()
    }

    /// Starts from a parsed declaration.
    pub fn from_config(config: SpecConfig) -> Self {
        QuerySpecBuilder {
            search_fields: config.search_fields,
            filter_groups: config.filter_groups,
            sorting: config.sorting,
            ..QuerySpecBuilder::default()
        }
    }

    /// Starts from a YAML declaration.
    pub fn from_yaml(source: &str) -> Result<Self> {
        SpecConfig::from_yaml(source).map(QuerySpecBuilder::from_config)
    }

    pub fn starting_scope<F>(mut self, start: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.starting_scope = Some(Arc::new(start));
        self
    }

    pub fn ending_scope<F>(mut self, end: F) -> Self
    where
        F: Fn(C, &Query<C>) -> std::result::Result<C, C::Error> + Send + Sync + 'static,
    {
        self.ending_scope = Some(Arc::new(end));
        self
    }

    /// Declares a pass-through search field.
    pub fn search_field(mut self, name: impl Into<String>) -> Self {
        self.search_fields.push(SearchField::new(name));
        self
    }

    /// Declares a search field whose value is coerced before use.
    pub fn search_field_as(mut self, name: impl Into<String>, kind: CoercionKind) -> Self {
        self.search_fields.push(SearchField::coerced(name, kind));
        self
    }

    pub fn filter_group<I, S>(mut self, name: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_groups.push(FilterGroup::new(name, scopes));
        self
    }

    pub fn sorting(mut self, sorting: Sorting) -> Self {
        self.sorting = Some(sorting);
        self
    }

    /// Registers a custom coercer usable as `CoercionKind::Custom(name)`.
    pub fn coercion<F>(mut self, name: impl Into<String>, coerce: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Value, CoercionError> + Send + Sync + 'static,
    {
        self.coercions.register(name, coerce);
        self
    }

    /// Validates and freezes the declaration.
    pub fn build(self) -> Result<QuerySpec<C>> {
        self.validate()?;
        Ok(QuerySpec {
            search_fields: self.search_fields,
            filter_groups: self.filter_groups,
            sorting: self.sorting,
            starting_scope: self.starting_scope,
            ending_scope: self.ending_scope,
            coercions: self.coercions,
        })
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let declared = self
            .search_fields
            .iter()
            .map(|f| &f.name)
            .chain(self.filter_groups.iter().map(|g| &g.name));
        for name in declared {
            if !names.insert(name.as_str()) {
                return Err(SpecError::DuplicateName(name.clone()));
            }
        }

        for field in &self.search_fields {
            match &field.coerce {
                Some(CoercionKind::Constant(allowed)) if allowed.is_empty() => {
                    return Err(SpecError::EmptyConstant(field.name.clone()));
                }
                Some(kind) if !self.coercions.supports(kind) => {
                    return Err(SpecError::UnknownCoercion {
                        field: field.name.clone(),
                        kind: kind.name().to_string(),
                    });
                }
                _ => {}
            }
        }

        for group in &self.filter_groups {
            check_scopes(&group.name, &group.scopes)?;
        }

        if let Some(sorting) = &self.sorting {
            check_scopes("sorting", &sorting.scopes)?;
            if let Some(default) = &sorting.default_scope {
                if !sorting.contains(default) {
                    return Err(SpecError::UnknownDefaultScope(default.clone()));
                }
            }
        }

        Ok(())
    }
}

fn check_scopes(owner: &str, scopes: &[String]) -> Result<()> {
    if scopes.is_empty() {
        return Err(SpecError::EmptyScopes(owner.to_string()));
    }
    let mut seen = HashSet::new();
    for scope in scopes {
        if !seen.insert(scope.as_str()) {
            return Err(SpecError::DuplicateScope {
                owner: owner.to_string(),
                scope: scope.clone(),
            });
        }
    }
    Ok(())
}
