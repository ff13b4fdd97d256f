//! Table presentation of list items.
//!
//! A [`TableSpec`] describes columns; [`TableSpec::present`] serializes
//! each record to JSON and extracts one cell per column. Keys use dot
//! notation for nested fields (`"assignee.name"`).
//!
//! ```rust
//! use serde::Serialize;
//! use sift::views::{Column, TableSpec};
//!
//! #[derive(Serialize)]
//! struct Task { title: String, owner: Option<String> }
//!
//! let spec = TableSpec::builder()
//!     .column(Column::new("title"))
//!     .column(Column::new("owner").header("Assigned to").null_repr("nobody"))
//!     .build();
//!
//! let table = spec
//!     .present(&[Task { title: "Ship it".into(), owner: None }])
//!     .unwrap();
//! assert_eq!(table.header_texts(), vec!["Title", "Assigned to"]);
//! assert_eq!(table.rows[0], vec!["Ship it", "nobody"]);
//! ```

use serde::Serialize;
use serde_json::Value;
use sift_query::{Collection, Dir, Params, Query};
use tracing::trace;

use super::form::humanize;
use super::toggle::{sort_toggle, Link};
use crate::error::{Result, ViewError};

/// One table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Dot-notation path into the serialized record.
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Shown for missing or null values.
    pub null_repr: String,
    /// Sort scope toggled from this column's header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl Column {
    pub fn new(key: impl Into<String>) -> Self {
        Column {
            key: key.into(),
            header: None,
            null_repr: "-".to_string(),
            sort: None,
        }
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn null_repr(mut self, null_repr: impl Into<String>) -> Self {
        self.null_repr = null_repr.into();
        self
    }

    /// Makes the header a toggle for sort scope `scope`.
    pub fn sortable(mut self, scope: impl Into<String>) -> Self {
        self.sort = Some(scope.into());
        self
    }

    /// Explicit header, else the humanized last key segment.
    pub fn header_text(&self) -> String {
        match &self.header {
            Some(header) => header.clone(),
            None => humanize(self.key.rsplit('.').next().unwrap_or(&self.key)),
        }
    }
}

/// Column layout for a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    pub columns: Vec<Column>,
}

impl TableSpec {
    pub fn builder() -> TableSpecBuilder {
        TableSpecBuilder::default()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn extract_header(&self) -> Vec<String> {
        self.columns.iter().map(Column::header_text).collect()
    }

    /// One cell per column; missing keys and nulls become `null_repr`.
    pub fn extract_row(&self, data: &Value) -> Vec<String> {
        self.columns
            .iter()
            .map(|col| {
                extract_value(data, &col.key).unwrap_or_else(|| {
                    trace!(key = %col.key, "no value for column");
                    col.null_repr.clone()
                })
            })
            .collect()
    }

    /// Renders `records` with plain headers.
    pub fn present<T: Serialize>(&self, records: &[T]) -> Result<Table> {
        self.render(records, None)
    }

    /// Renders `records` with sort toggles on sortable column headers.
    ///
    /// Fails when a column sorts by a scope the query does not declare.
    pub fn present_sorted<T: Serialize, C: Collection>(
        &self,
        records: &[T],
        query: &Query<C>,
    ) -> Result<Table> {
        self.render(records, Some(&SortContext::of(query)))
    }

    pub(crate) fn render<T: Serialize>(
        &self,
        records: &[T],
        sort: Option<&SortContext>,
    ) -> Result<Table> {
        let headers = self
            .columns
            .iter()
            .map(|col| header_cell(col, sort))
            .collect::<Result<Vec<_>>>()?;

        let rows = records
            .iter()
            .map(|record| Ok(self.extract_row(&serde_json::to_value(record)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Table { headers, rows })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableSpecBuilder {
    columns: Vec<Column>,
}

impl TableSpecBuilder {
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn build(self) -> TableSpec {
        TableSpec {
            columns: self.columns,
        }
    }
}

/// A rendered column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub text: String,
    /// Sort toggle, present for sortable columns rendered with a query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    /// Current direction when this column's scope is the active sort.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Dir>,
}

/// A rendered table: headers plus stringified cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn header_texts(&self) -> Vec<&str> {
        self.headers.iter().map(|h| h.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Owned snapshot of a query's sorting, detached from its collection type.
#[derive(Debug, Clone)]
pub(crate) struct SortContext {
    params: Params,
    scopes: Vec<String>,
    active: Option<String>,
    direction: Dir,
}

impl SortContext {
    pub(crate) fn of<C: Collection>(query: &Query<C>) -> Self {
        let sorting = query.sorting();
        SortContext {
            params: query.params().clone(),
            scopes: sorting.map(|s| s.scopes().to_vec()).unwrap_or_default(),
            active: sorting.and_then(|s| s.active()).map(str::to_string),
            direction: sorting.map(|s| s.direction()).unwrap_or_default(),
        }
    }
}

fn header_cell(col: &Column, sort: Option<&SortContext>) -> Result<HeaderCell> {
    let text = col.header_text();
    let (scope, ctx) = match (&col.sort, sort) {
        (Some(scope), Some(ctx)) => (scope, ctx),
        _ => {
            return Ok(HeaderCell {
                text,
                link: None,
                direction: None,
            })
        }
    };

    if !ctx.scopes.iter().any(|s| s == scope) {
        return Err(ViewError::UnknownSortScope {
            column: col.key.clone(),
            scope: scope.clone(),
        });
    }

    let active = ctx.active.as_deref();
    Ok(HeaderCell {
        text,
        link: Some(sort_toggle(&ctx.params, active, ctx.direction, scope)),
        direction: (active == Some(scope.as_str())).then_some(ctx.direction),
    })
}

fn extract_value(data: &Value, path: &str) -> Option<String> {
    let mut current = data;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        v => Some(v.to_string()),
    }
}
