//! Sift - search, filter and sort for list screens.
//!
//! This crate re-exports [`sift_query`] (as [`query`]) for resolving request
//! parameters into scope chains, and adds [`views`], which turns a resolved
//! query into links, a search form and tables for rendering.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use sift::query::memory::{Relation, Scopes};
//! use sift::query::{Params, Query, QuerySpec, Sorting};
//! use sift::views::{list_view, Column, TableSpec};
//!
//! #[derive(Clone, serde::Serialize)]
//! struct Post { title: String, published: bool }
//!
//! let posts = vec![
//!     Post { title: "Hello".into(), published: true },
//!     Post { title: "Draft".into(), published: false },
//! ];
//! let scopes = Arc::new(
//!     Scopes::new()
//!         .filter("published", |p: &Post| p.published)
//!         .filter("drafts", |p: &Post| !p.published)
//!         .sort("by_title", |a: &Post, b: &Post| a.title.cmp(&b.title)),
//! );
//!
//! let spec = QuerySpec::builder()
//!     .starting_scope(move || Relation::new(posts.clone(), Arc::clone(&scopes)))
//!     .filter_group("state", ["published", "drafts"])
//!     .sorting(Sorting::new(["by_title"]).default_scope("by_title"))
//!     .build()
//!     .unwrap();
//!
//! let query = Query::new(spec, Params::from_query_string("sort_order=desc"));
//! let posts = query.scoped().unwrap().load();
//!
//! let view = list_view(posts)
//!     .query(&query)
//!     .table(TableSpec::builder().column(Column::new("title").sortable("by_title")).build())
//!     .build()
//!     .unwrap();
//!
//! let table = view.table.unwrap();
//! assert_eq!(table.rows, vec![vec!["Hello"], vec!["Draft"]]);
//! assert_eq!(table.headers[0].link.as_ref().unwrap().params.get_str("sort_order"), Some("asc"));
//! ```

pub mod error;
pub mod views;

pub use sift_query as query;

pub use error::{Result, ViewError};
pub use sift_query::{Params, Query, QuerySpec};
