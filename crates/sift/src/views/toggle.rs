//! Links that toggle one part of a query.
//!
//! Each link starts from the current request's parameters, changes one
//! thing and drops `page`, since the result set changes underneath it.

use serde::Serialize;
use sift_query::{
    Collection, Dir, Params, Query, PAGE_KEY, QUERY_KEY, SORTING_KEY, SORT_ORDER_KEY,
};

/// A link to the same list with different parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Parameters the link requests.
    pub params: Params,
    /// `?` followed by the encoded parameters.
    pub href: String,
    /// Whether the toggled item is currently in effect.
    pub active: bool,
}

impl Link {
    pub fn new(params: Params, active: bool) -> Self {
        let href = format!("?{}", params.to_query_string());
        Link {
            params,
            href,
            active,
        }
    }

    /// The link against a concrete path, e.g. `/admin/tasks`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", path, self.href)
    }
}

/// Toggles `scope` within filter group `group`.
///
/// When `scope` is active the link removes the group's parameter,
/// otherwise it selects `scope`, replacing any sibling.
pub fn filter_link<C: Collection>(query: &Query<C>, group: &str, scope: &str) -> Link {
    let active = query.active_filter(group) == Some(scope);
    let mut params = query.params().clone();
    params.remove(PAGE_KEY);
    if active {
        params.remove_query(group);
    } else {
        params.set_query(group, scope);
    }
    Link::new(params, active)
}

/// Toggles sorting by `scope`: an inactive scope sorts ascending, the
/// active one flips its direction.
pub fn sort_link<C: Collection>(query: &Query<C>, scope: &str) -> Link {
    let (active, direction) = match query.sorting() {
        Some(sorting) => (sorting.active(), sorting.direction()),
        None => (None, Dir::default()),
    };
    sort_toggle(query.params(), active, direction, scope)
}

pub(crate) fn sort_toggle(
    params: &Params,
    active: Option<&str>,
    direction: Dir,
    scope: &str,
) -> Link {
    let is_active = active == Some(scope);
    let next = if is_active { direction.reverse() } else { Dir::Asc };

    let mut params = params.clone();
    params.remove(PAGE_KEY);
    params.insert(SORTING_KEY, scope);
    params.insert(SORT_ORDER_KEY, next.as_str());
    Link::new(params, is_active)
}

/// Drops every search, filter, sort and page parameter.
///
/// Active when there is nothing left to clear.
pub fn clear_link<C: Collection>(query: &Query<C>) -> Link {
    let mut params = query.params().clone();
    let mut cleared = false;
    for key in [QUERY_KEY, SORTING_KEY, SORT_ORDER_KEY, PAGE_KEY] {
        cleared |= params.remove(key).is_some();
    }
    Link::new(params, !cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_query::{QuerySpec, Sorting, Value};

    #[derive(Debug)]
    struct Noop;

    impl Collection for Noop {
        type Error = std::convert::Infallible;

        fn apply_scope(self, _scope: &str, _args: &[Value]) -> Result<Self, Self::Error> {
            Ok(self)
        }
    }

    fn query(params: Params) -> Query<Noop> {
        let spec = QuerySpec::builder()
            .search_field("title_matches")
            .filter_group("status", ["completed", "pending"])
            .sorting(Sorting::new(["by_title", "by_due_date"]))
            .build()
            .unwrap();
        Query::new(spec, params)
    }

    #[test]
    fn filter_link_selects_inactive_scope() {
        let q = query(Params::new().with_query("status", "pending").with("page", "3"));
        let link = filter_link(&q, "status", "completed");

        assert!(!link.active);
        assert_eq!(link.params.query_value("status"), Some("completed"));
        assert!(!link.params.contains_key("page"));
    }

    #[test]
    fn filter_link_deselects_active_scope() {
        let q = query(
            Params::new()
                .with_query("status", "pending")
                .with_query("title_matches", "ASAP"),
        );
        let link = filter_link(&q, "status", "pending");

        assert!(link.active);
        assert_eq!(link.params.query_value("status"), None);
        assert_eq!(link.params.query_value("title_matches"), Some("ASAP"));
    }

    #[test]
    fn deselecting_last_query_value_drops_query() {
        let q = query(Params::new().with_query("status", "pending"));
        let link = filter_link(&q, "status", "pending");
        assert!(link.params.is_empty());
        assert_eq!(link.href, "?");
    }

    #[test]
    fn sort_link_starts_ascending() {
        let q = query(
            Params::new()
                .with("sorting", "by_title")
                .with("sort_order", "desc"),
        );
        let link = sort_link(&q, "by_due_date");

        assert!(!link.active);
        assert_eq!(link.params.get_str("sorting"), Some("by_due_date"));
        assert_eq!(link.params.get_str("sort_order"), Some("asc"));
    }

    #[test]
    fn sort_link_flips_active_direction() {
        let q = query(
            Params::new()
                .with("sorting", "by_title")
                .with("sort_order", "desc")
                .with("page", "2"),
        );
        let link = sort_link(&q, "by_title");

        assert!(link.active);
        assert_eq!(link.params.get_str("sort_order"), Some("asc"));
        assert_eq!(link.href, "?sort_order=asc&sorting=by_title");
    }

    #[test]
    fn clear_link_keeps_unrelated_params() {
        let q = query(
            Params::new()
                .with_query("status", "pending")
                .with("sorting", "by_title")
                .with("page", "2")
                .with("per_page", "50"),
        );
        let link = clear_link(&q);

        assert!(!link.active);
        assert_eq!(link.params, Params::new().with("per_page", "50"));
        assert_eq!(link.url("/admin/tasks"), "/admin/tasks?per_page=50");

        assert!(clear_link(&query(Params::new())).active);
    }
}
