//! ListView result type and builder.
//!
//! ListView bundles what an index screen renders:
//! - the items (already searched, filtered, sorted and paged)
//! - an optional table built from a [`TableSpec`]
//! - the search form for the current query
//! - a summary of the active filters and the total count

use serde::Serialize;
use sift_query::{Collection, Query};

use super::form::{filter_summary, SearchForm};
use super::table::{SortContext, Table, TableSpec};
use crate::error::Result;

/// Result type for list screens.
#[derive(Debug, Clone, Serialize)]
pub struct ListViewResult<T> {
    /// Items to display.
    pub items: Vec<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<SearchForm>,

    /// Active filters, e.g. "status=pending".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_summary: Option<String>,

    /// Total count before paging (for "showing X of Y").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

impl<T> ListViewResult<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            table: None,
            form: None,
            filter_summary: None,
            total_count: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when fewer items are shown than matched.
    pub fn is_partial(&self) -> bool {
        self.total_count.is_some_and(|total| total > self.items.len())
    }
}

impl<T> Default for ListViewResult<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Builder for [`ListViewResult`]. Start with [`list_view()`]:
///
/// ```rust
/// use serde::Serialize;
/// use sift::query::memory::{Relation, Scopes};
/// use sift::query::{Params, Query, QuerySpec, Sorting};
/// use sift::views::{list_view, Column, TableSpec};
///
/// #[derive(Clone, Serialize)]
/// struct Task { title: String, done: bool }
///
/// let scopes = Scopes::new()
///     .filter("pending", |t: &Task| !t.done)
///     .sort("by_title", |a: &Task, b: &Task| a.title.cmp(&b.title));
/// let spec = QuerySpec::builder()
///     .filter_group("status", ["pending"])
///     .sorting(Sorting::new(["by_title"]))
///     .build()
///     .unwrap();
/// let query = Query::new(spec, Params::from_query_string("query[status]=pending"));
///
/// let tasks = vec![
///     Task { title: "b".into(), done: false },
///     Task { title: "a".into(), done: true },
/// ];
/// let relation = query.apply_to(Relation::new(tasks, scopes)).unwrap();
///
/// let view = list_view(relation.load())
///     .query(&query)
///     .table(TableSpec::builder().column(Column::new("title").sortable("by_title")).build())
///     .total_count(relation.total_count())
///     .build()
///     .unwrap();
///
/// assert_eq!(view.len(), 1);
/// assert_eq!(view.filter_summary.as_deref(), Some("status=pending"));
/// ```
#[derive(Debug)]
pub struct ListViewBuilder<T> {
    items: Vec<T>,
    table: Option<TableSpec>,
    form: Option<SearchForm>,
    sort: Option<SortContext>,
    filter_summary: Option<String>,
    total_count: Option<usize>,
}

impl<T> ListViewBuilder<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            table: None,
            form: None,
            sort: None,
            filter_summary: None,
            total_count: None,
        }
    }

    /// Derives the search form, filter summary and sortable headers
    /// from `query`.
    pub fn query<C: Collection>(mut self, query: &Query<C>) -> Self {
        self.form = Some(SearchForm::from_query(query));
        self.sort = Some(SortContext::of(query));
        self.filter_summary = filter_summary(query);
        self
    }

    /// Renders items as a table with this layout.
    pub fn table(mut self, spec: TableSpec) -> Self {
        self.table = Some(spec);
        self
    }

    pub fn total_count(mut self, count: usize) -> Self {
        self.total_count = Some(count);
        self
    }

    /// Overrides the summary derived from the query.
    pub fn filter_summary(mut self, summary: impl Into<String>) -> Self {
        self.filter_summary = Some(summary.into());
        self
    }

    /// Builds the result, rendering the table if one was configured.
    pub fn build(self) -> Result<ListViewResult<T>>
    where
        T: Serialize,
    {
        let table = match &self.table {
            Some(spec) => Some(spec.render(&self.items, self.sort.as_ref())?),
            None => None,
        };

        Ok(ListViewResult {
            items: self.items,
            table,
            form: self.form,
            filter_summary: self.filter_summary,
            total_count: self.total_count,
        })
    }
}

/// Starts building a [`ListViewResult`].
pub fn list_view<T>(items: impl IntoIterator<Item = T>) -> ListViewBuilder<T> {
    ListViewBuilder::new(items)
}
