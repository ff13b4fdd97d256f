//! View models for list screens.
//!
//! Everything here turns a resolved [`Query`](sift_query::Query) into
//! plain serializable data for a template layer:
//!
//! - [`filter_link`], [`sort_link`] and [`clear_link`] build [`Link`]s that
//!   toggle one part of the current query
//! - [`SearchForm`] describes the search inputs, filter toggles and sort
//!   options
//! - [`TableSpec`] lays items out as a [`Table`] with sortable headers
//! - [`list_view`] bundles all of it with the items
//!
//! ```rust
//! use sift::query::{Params, Query, QuerySpec, Value};
//! use sift::views::{filter_link, SearchForm};
//! # use sift::query::Collection;
//! # struct Noop;
//! # impl Collection for Noop {
//! #     type Error = std::convert::Infallible;
//! #     fn apply_scope(self, _: &str, _: &[Value]) -> Result<Self, Self::Error> { Ok(self) }
//! # }
//!
//! let spec: QuerySpec<Noop> = QuerySpec::builder()
//!     .filter_group("status", ["completed", "pending"])
//!     .build()
//!     .unwrap();
//! let query = Query::new(spec, Params::new().with_query("status", "pending"));
//!
//! let link = filter_link(&query, "status", "completed");
//! assert_eq!(link.href, "?query%5Bstatus%5D=completed");
//!
//! let form = SearchForm::from_query(&query);
//! assert!(form.filters[0].options[1].active);
//! ```

mod form;
mod list_view;
mod table;
mod toggle;

pub use form::{
    filter_summary, humanize, FieldControl, FilterControl, FilterOption, SearchForm, SortControl,
    SortOption,
};
pub use list_view::{list_view, ListViewBuilder, ListViewResult};
pub use table::{Column, HeaderCell, Table, TableSpec, TableSpecBuilder};
pub use toggle::{clear_link, filter_link, sort_link, Link};
